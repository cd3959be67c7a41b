// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::job::CrossPostJob;
use crate::publisher::CrossPostPublisher;

/// Bounded queue with a single worker that publishes jobs one at a time.
///
/// ```text
/// request handler ──submit()──▶ [ mpsc, capacity N ] ──▶ worker ──▶ publisher
///                   (try_send)                            (logs outcome)
/// ```
///
/// `submit` never waits: a full or closed queue drops the job. `shutdown`
/// closes the queue and gives the worker a bounded time to drain it.
pub struct CrossPostService {
	tx: Mutex<Option<mpsc::Sender<CrossPostJob>>>,
	worker: Mutex<Option<JoinHandle<()>>>,
}

impl CrossPostService {
	/// Start the worker. Must be called inside a Tokio runtime.
	pub fn new(publisher: Arc<dyn CrossPostPublisher>, queue_capacity: usize) -> Self {
		let (tx, rx) = mpsc::channel(queue_capacity.max(1));

		let worker = tokio::spawn(Self::background_task(rx, publisher));

		Self {
			tx: Mutex::new(Some(tx)),
			worker: Mutex::new(Some(worker)),
		}
	}

	async fn background_task(
		mut rx: mpsc::Receiver<CrossPostJob>,
		publisher: Arc<dyn CrossPostPublisher>,
	) {
		while let Some(job) = rx.recv().await {
			match publisher.publish(&job).await {
				Ok(()) => info!(
					publisher = publisher.name(),
					user_id = %job.user_id,
					post_id = %job.post_id,
					"cross-post published"
				),
				Err(e) => warn!(
					publisher = publisher.name(),
					user_id = %job.user_id,
					post_id = %job.post_id,
					error = %e,
					"cross-post failed"
				),
			}
		}
		info!("cross-post worker stopped");
	}

	/// Queue a job without waiting.
	///
	/// Returns `true` if queued, `false` if dropped because the queue is full
	/// or already shut down.
	#[instrument(skip(self, job), fields(user_id = %job.user_id, post_id = %job.post_id))]
	pub fn submit(&self, job: CrossPostJob) -> bool {
		let guard = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
		let Some(tx) = guard.as_ref() else {
			warn!("cross-post queue is shut down, dropping job");
			return false;
		};

		match tx.try_send(job) {
			Ok(()) => true,
			Err(TrySendError::Full(_)) => {
				warn!("cross-post queue full, dropping job");
				false
			}
			Err(TrySendError::Closed(_)) => {
				warn!("cross-post worker gone, dropping job");
				false
			}
		}
	}

	/// Close the queue and wait up to `timeout` for queued jobs to finish.
	///
	/// Returns `true` if the worker drained everything in time. On timeout the
	/// worker is aborted and any remaining jobs are discarded. Later calls
	/// return `true` immediately.
	pub async fn shutdown(&self, timeout: Duration) -> bool {
		drop(self.tx.lock().unwrap_or_else(PoisonError::into_inner).take());

		let Some(worker) = self
			.worker
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.take()
		else {
			return true;
		};

		let abort = worker.abort_handle();
		match tokio::time::timeout(timeout, worker).await {
			Ok(Ok(())) => {
				info!("cross-post queue drained");
				true
			}
			Ok(Err(e)) => {
				warn!(error = %e, "cross-post worker ended abnormally");
				false
			}
			Err(_) => {
				warn!(
					timeout_ms = timeout.as_millis() as u64,
					"cross-post drain timed out, discarding remaining jobs"
				);
				abort.abort();
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::CrossPostError;
	use async_trait::async_trait;
	use otogram_server_auth::{PostId, UserId};
	use std::sync::atomic::{AtomicUsize, Ordering};
	use tokio::sync::Notify;
	use tokio::time::sleep;

	struct CountingPublisher {
		published: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl CrossPostPublisher for CountingPublisher {
		fn name(&self) -> &str {
			"counting"
		}

		async fn publish(&self, _job: &CrossPostJob) -> Result<(), CrossPostError> {
			self.published.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}
	}

	struct FailingPublisher {
		attempts: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl CrossPostPublisher for FailingPublisher {
		fn name(&self) -> &str {
			"failing"
		}

		async fn publish(&self, job: &CrossPostJob) -> Result<(), CrossPostError> {
			self.attempts.fetch_add(1, Ordering::SeqCst);
			Err(CrossPostError::NotConnected(job.user_id))
		}
	}

	/// Blocks every publish until released.
	struct GatedPublisher {
		gate: Arc<Notify>,
		published: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl CrossPostPublisher for GatedPublisher {
		fn name(&self) -> &str {
			"gated"
		}

		async fn publish(&self, _job: &CrossPostJob) -> Result<(), CrossPostError> {
			self.gate.notified().await;
			self.published.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}
	}

	fn job(n: i64) -> CrossPostJob {
		CrossPostJob::new(UserId::new(1), PostId::new(n), "comment", "http://app")
	}

	#[tokio::test]
	async fn submitted_jobs_are_published() {
		let published = Arc::new(AtomicUsize::new(0));
		let service = CrossPostService::new(
			Arc::new(CountingPublisher {
				published: Arc::clone(&published),
			}),
			8,
		);

		assert!(service.submit(job(1)));
		assert!(service.submit(job(2)));

		assert!(service.shutdown(Duration::from_secs(1)).await);
		assert_eq!(published.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn failures_are_swallowed_and_worker_continues() {
		let attempts = Arc::new(AtomicUsize::new(0));
		let service = CrossPostService::new(
			Arc::new(FailingPublisher {
				attempts: Arc::clone(&attempts),
			}),
			8,
		);

		for n in 0..3 {
			assert!(service.submit(job(n)));
		}
		assert!(service.shutdown(Duration::from_secs(1)).await);
		assert_eq!(attempts.load(Ordering::SeqCst), 3);
	}

	#[tokio::test]
	async fn full_queue_drops_newest() {
		let gate = Arc::new(Notify::new());
		let published = Arc::new(AtomicUsize::new(0));
		let service = CrossPostService::new(
			Arc::new(GatedPublisher {
				gate: Arc::clone(&gate),
				published: Arc::clone(&published),
			}),
			1,
		);

		assert!(service.submit(job(1)));
		// Let the worker take job 1 and block on the gate.
		sleep(Duration::from_millis(50)).await;
		assert!(service.submit(job(2)));
		assert!(!service.submit(job(3)));

		gate.notify_one();
		sleep(Duration::from_millis(20)).await;
		gate.notify_one();
		assert!(service.shutdown(Duration::from_secs(1)).await);
		assert_eq!(published.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn submit_after_shutdown_is_rejected() {
		let published = Arc::new(AtomicUsize::new(0));
		let service = CrossPostService::new(
			Arc::new(CountingPublisher {
				published: Arc::clone(&published),
			}),
			4,
		);

		assert!(service.shutdown(Duration::from_secs(1)).await);
		assert!(!service.submit(job(1)));
		assert!(service.shutdown(Duration::from_secs(1)).await);
		assert_eq!(published.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn shutdown_times_out_on_stuck_publisher() {
		let gate = Arc::new(Notify::new());
		let published = Arc::new(AtomicUsize::new(0));
		let service = CrossPostService::new(
			Arc::new(GatedPublisher {
				gate,
				published: Arc::clone(&published),
			}),
			4,
		);

		assert!(service.submit(job(1)));
		assert!(!service.shutdown(Duration::from_millis(50)).await);
		assert_eq!(published.load(Ordering::SeqCst), 0);
	}
}
