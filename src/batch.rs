//! Worker pool for aligning many independent pairs.
//!
//! Every work item is a separate alignment call with its own tables. The
//! pool only fans pairs out to threads and puts results back in input
//! order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::{error, trace};

use crate::{Aligner, AlignerError, AlignmentResult};

struct WorkItem {
    index: usize,
    seq_a: Arc<str>,
    seq_b: Arc<str>,
}

struct WorkResult {
    index: usize,
    worker_id: usize,
    result: Result<AlignmentResult, AlignerError>,
}

pub struct AlignmentPool {
    work_tx: Option<Sender<WorkItem>>,
    result_rx: Receiver<WorkResult>,
    workers: Vec<thread::JoinHandle<()>>,
}

impl AlignmentPool {
    /// Spawns `aligner.config().workers` threads sharing `aligner`.
    pub fn new(aligner: Aligner) -> Result<Self, AlignerError> {
        let worker_count = aligner.config().workers;
        Self::with_task(worker_count, move |a: &str, b: &str| aligner.align(a, b))
    }

    fn with_task<F>(worker_count: usize, task: F) -> Result<Self, AlignerError>
    where
        F: Fn(&str, &str) -> Result<AlignmentResult, AlignerError> + Send + Sync + 'static,
    {
        if worker_count == 0 {
            return Err(AlignerError::ConfigurationError(
                "batch alignment needs at least one worker".to_string(),
            ));
        }

        let (work_tx, work_rx) = bounded::<WorkItem>(worker_count * 2);
        let (result_tx, result_rx) = unbounded();
        let task = Arc::new(task);

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let task = Arc::clone(&task);
            let worker = thread::Builder::new()
                .name(format!("nucalign-worker-{}", worker_id))
                .spawn(move || Self::worker(worker_id, task, work_rx, result_tx))
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
            workers.push(worker);
        }

        Ok(Self {
            work_tx: Some(work_tx),
            result_rx,
            workers,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Every received item yields exactly one result, even when the task
    /// panics, so `run` never waits on a pair that was lost.
    fn worker<F>(
        worker_id: usize,
        task: Arc<F>,
        work_rx: Receiver<WorkItem>,
        result_tx: Sender<WorkResult>,
    ) where
        F: Fn(&str, &str) -> Result<AlignmentResult, AlignerError>,
    {
        while let Ok(work) = work_rx.recv() {
            trace!("worker {} aligning pair {}", worker_id, work.index);
            let call = AssertUnwindSafe(|| task(&*work.seq_a, &*work.seq_b));
            let result = panic::catch_unwind(call).unwrap_or_else(|_| {
                error!("worker {} panicked on pair {}", worker_id, work.index);
                Err(AlignerError::WorkerError(format!(
                    "worker {} panicked on pair {}",
                    worker_id, work.index
                )))
            });
            let sent = result_tx.send(WorkResult {
                index: work.index,
                worker_id,
                result,
            });
            if sent.is_err() {
                break;
            }
        }
    }

    /// Aligns every pair; the output holds one result per pair, in order.
    pub fn align_pairs(
        &mut self,
        pairs: Vec<(String, String)>,
    ) -> Result<Vec<Result<AlignmentResult, AlignerError>>, AlignerError> {
        let items = pairs
            .into_iter()
            .map(|(a, b)| (Arc::from(a), Arc::from(b)))
            .collect();
        self.run(items)
    }

    /// Aligns one query against each reference, sharing the query buffer.
    pub fn align_one_to_many(
        &mut self,
        query: &str,
        references: &[String],
    ) -> Result<Vec<Result<AlignmentResult, AlignerError>>, AlignerError> {
        let query: Arc<str> = Arc::from(query);
        let items = references
            .iter()
            .map(|reference| (Arc::clone(&query), Arc::from(reference.as_str())))
            .collect();
        self.run(items)
    }

    fn run(
        &mut self,
        items: Vec<(Arc<str>, Arc<str>)>,
    ) -> Result<Vec<Result<AlignmentResult, AlignerError>>, AlignerError> {
        let total = items.len();
        let work_tx = self
            .work_tx
            .as_ref()
            .ok_or_else(|| AlignerError::WorkerError("pool is shut down".to_string()))?;

        // Results are unbounded, so workers never block while we are still
        // feeding the bounded work queue.
        for (index, (seq_a, seq_b)) in items.into_iter().enumerate() {
            work_tx
                .send(WorkItem {
                    index,
                    seq_a,
                    seq_b,
                })
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
        }

        let mut results: Vec<Option<Result<AlignmentResult, AlignerError>>> =
            (0..total).map(|_| None).collect();
        for _ in 0..total {
            let work_result = self
                .result_rx
                .recv()
                .map_err(|e| AlignerError::WorkerError(e.to_string()))?;
            trace!(
                "pair {} finished on worker {}",
                work_result.index,
                work_result.worker_id
            );
            results[work_result.index] = Some(work_result.result);
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, result)| {
                result.ok_or_else(|| {
                    AlignerError::WorkerError(format!("no result for pair {}", index))
                })
            })
            .collect()
    }
}

impl Drop for AlignmentPool {
    fn drop(&mut self) {
        // Closing the work queue stops the workers
        self.work_tx.take();

        while let Some(worker) = self.workers.pop() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AlignerConfig, AlignmentMode, ScoringConfig};

    fn pool(workers: usize, mode: AlignmentMode) -> AlignmentPool {
        let scoring = ScoringConfig::new(1.0, -1.0, 2.0, 1.0).unwrap();
        let aligner = Aligner::new(AlignerConfig::default().with_workers(workers))
            .with_scoring(scoring)
            .with_alignment_mode(mode);
        AlignmentPool::new(aligner).unwrap()
    }

    #[test]
    fn test_results_keep_input_order() {
        let mut pool = pool(3, AlignmentMode::Global);
        let pairs: Vec<(String, String)> = (0..20)
            .map(|n| ("A".repeat(n), "A".repeat(n)))
            .collect();
        let results = pool.align_pairs(pairs).unwrap();
        assert_eq!(results.len(), 20);
        for (n, result) in results.into_iter().enumerate() {
            let result = result.unwrap();
            assert_eq!(result.score, n as f64);
            assert_eq!(result.alignment_length(), n);
        }
    }

    #[test]
    fn test_one_to_many_matches_serial_calls() {
        let mut pool = pool(2, AlignmentMode::Local);
        let references = vec![
            "GCATGCU".to_string(),
            "TTTT".to_string(),
            "GATTACA".to_string(),
        ];
        let results = pool.align_one_to_many("GATTACA", &references).unwrap();
        let scoring = ScoringConfig::new(1.0, -1.0, 2.0, 1.0).unwrap();
        for (reference, result) in references.iter().zip(results) {
            let serial = crate::align("GATTACA", reference, &scoring, AlignmentMode::Local).unwrap();
            assert_eq!(result.unwrap(), serial);
        }
    }

    #[test]
    fn test_errors_stay_with_their_pair() {
        let mut pool = pool(2, AlignmentMode::Global);
        let pairs = vec![
            ("ACGT".to_string(), "ACGT".to_string()),
            ("ACXT".to_string(), "ACGT".to_string()),
            ("ACGT".to_string(), "ACG".to_string()),
        ];
        let results = pool.align_pairs(pairs).unwrap();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(AlignerError::InvalidInputError { symbol: 'X', .. })
        ));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_pool_is_reusable_and_handles_empty_batch() {
        let mut pool = pool(1, AlignmentMode::Global);
        assert!(pool.align_pairs(Vec::new()).unwrap().is_empty());
        let results = pool
            .align_pairs(vec![("AC".to_string(), "AC".to_string())])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(pool.worker_count(), 1);
    }

    #[test]
    fn test_panicking_pair_reports_worker_error() {
        let scoring = ScoringConfig::new(1.0, -1.0, 2.0, 1.0).unwrap();
        let mut pool = AlignmentPool::with_task(2, move |a: &str, b: &str| {
            if a == "N" {
                panic!("alignment task failed");
            }
            crate::align(a, b, &scoring, AlignmentMode::Global)
        })
        .unwrap();

        let pairs = vec![
            ("ACGT".to_string(), "ACGT".to_string()),
            ("N".to_string(), "A".to_string()),
            ("GATTACA".to_string(), "GATTACA".to_string()),
        ];
        let results = pool.align_pairs(pairs).unwrap();
        assert_eq!(results[0].as_ref().unwrap().score, 4.0);
        assert!(matches!(results[1], Err(AlignerError::WorkerError(_))));
        assert_eq!(results[2].as_ref().unwrap().score, 7.0);

        // Both workers survive and keep serving.
        let results = pool
            .align_pairs(vec![("AC".to_string(), "AC".to_string()); 4])
            .unwrap();
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let aligner = Aligner::new(AlignerConfig::default().with_workers(0));
        assert!(matches!(
            AlignmentPool::new(aligner),
            Err(AlignerError::ConfigurationError(_))
        ));
    }
}
