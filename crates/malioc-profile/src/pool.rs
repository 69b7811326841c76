//! 并行调用编译器的线程池
//!
//! 每个任务占用一个线程并阻塞到子进程结束；结果按完成顺序送回调用线程，
//! 报告文件只由调用线程写入。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Receiver;

use crate::error::ProfileResult;
use crate::invoker::{CompileOutcome, OfflineCompiler};
use crate::shader_file::ShaderFile;

/// 一个文件的编译结果
#[derive(Debug)]
pub struct CompileResult {
    pub file: ShaderFile,
    pub outcome: ProfileResult<CompileOutcome>,
}

pub struct CompilePool {
    pool: rayon::ThreadPool,
    cancelled: Arc<AtomicBool>,
}

impl CompilePool {
    pub fn new(job_count: usize) -> ProfileResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(job_count.max(1))
            .thread_name(|idx| format!("malioc-worker-{idx}"))
            .build()?;

        Ok(Self {
            pool,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn job_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// 按顺序提交所有文件，返回按完成顺序产出结果的 channel
    ///
    /// 所有任务结束 (或被取消) 后 channel 关闭
    pub fn dispatch(&self, compiler: Arc<dyn OfflineCompiler>, files: Vec<ShaderFile>) -> Receiver<CompileResult> {
        let (sender, receiver) = crossbeam_channel::unbounded();

        for file in files {
            let sender = sender.clone();
            let compiler = Arc::clone(&compiler);
            let cancelled = Arc::clone(&self.cancelled);

            self.pool.spawn_fifo(move || {
                if cancelled.load(Ordering::Acquire) {
                    return;
                }
                let outcome = compiler.compile(&file);
                // 接收端已经放弃时忽略
                let _ = sender.send(CompileResult { file, outcome });
            });
        }

        receiver
    }

    /// 尚未开始的任务不再启动编译器；已经在运行的进程不会被终止
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct CountingCompiler {
        calls: AtomicUsize,
    }

    impl OfflineCompiler for CountingCompiler {
        fn compile(&self, file: &ShaderFile) -> ProfileResult<CompileOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompileOutcome::Success(file.file_name()))
        }
    }

    #[test]
    fn test_every_file_is_reported() {
        let pool = CompilePool::new(3).unwrap();
        let compiler = Arc::new(CountingCompiler { calls: AtomicUsize::new(0) });
        let files: Vec<_> = (0..20).map(|i| ShaderFile::new(format!("s-{i}.frag"))).collect();

        let mut names: Vec<_> = pool
            .dispatch(compiler.clone(), files)
            .iter()
            .map(|result| result.file.file_name())
            .collect();
        names.sort();

        assert_eq!(names.len(), 20);
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 20);
        assert_eq!(pool.job_count(), 3);
    }

    #[test]
    fn test_cancel_skips_queued_work() {
        let pool = CompilePool::new(1).unwrap();
        pool.cancel();
        let compiler = Arc::new(CountingCompiler { calls: AtomicUsize::new(0) });

        let received: Vec<_> = pool.dispatch(compiler.clone(), vec![ShaderFile::new("a.frag")]).iter().collect();

        assert!(received.is_empty());
        assert_eq!(compiler.calls.load(Ordering::SeqCst), 0);
    }
}
