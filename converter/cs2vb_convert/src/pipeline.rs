//! Multi-document conversion pipeline.
//!
//! Documents are independent: each rayon task owns its own
//! [`DocumentConverter`] (and so its own porter), and no conversion state
//! crosses document boundaries. Cancellation is cooperative and coarse —
//! the flag is checked once per document, before conversion starts, never
//! mid-algorithm.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::info_span;

use crate::{ConvertError, DocumentConverter};

/// One document to convert.
#[derive(Clone, Debug)]
pub struct DocumentJob {
    pub name: String,
    pub source_text: String,
}

impl DocumentJob {
    pub fn new(name: impl Into<String>, source_text: impl Into<String>) -> Self {
        DocumentJob {
            name: name.into(),
            source_text: source_text.into(),
        }
    }
}

/// Pipeline options.
#[derive(Clone, Debug, Default)]
pub struct ConvertOptions {
    /// Worker count; `0` uses the global pool sized to available
    /// parallelism.
    pub threads: usize,
    /// Cooperative cancellation flag, checked between documents only.
    pub cancel: Option<Arc<AtomicBool>>,
}

/// Convert many documents on a bounded worker pool.
///
/// `convert` is the per-document body: it receives a fresh converter and
/// the job, drives the (external) node visitors, and returns whatever the
/// caller wants per document. Results come back in job order.
pub fn convert_documents<T, F>(
    jobs: &[DocumentJob],
    options: &ConvertOptions,
    convert: F,
) -> Vec<Result<T, ConvertError>>
where
    T: Send,
    F: Fn(&mut DocumentConverter, &DocumentJob) -> Result<T, ConvertError> + Sync,
{
    let run_one = |job: &DocumentJob| -> Result<T, ConvertError> {
        if is_cancelled(options) {
            return Err(ConvertError::Cancelled {
                document: job.name.clone(),
            });
        }
        let span = info_span!("convert_document", document = %job.name);
        let _guard = span.enter();
        let mut converter = DocumentConverter::new(&job.name, &job.source_text);
        convert(&mut converter, job)
    };

    if options.threads > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.threads)
            .build()
        {
            Ok(pool) => pool.install(|| jobs.par_iter().map(run_one).collect()),
            // A pool that fails to spawn is not fatal; fall back to the
            // global pool.
            Err(_) => jobs.par_iter().map(run_one).collect(),
        }
    } else {
        jobs.par_iter().map(run_one).collect()
    }
}

fn is_cancelled(options: &ConvertOptions) -> bool {
    options
        .cancel
        .as_ref()
        .is_some_and(|flag| flag.load(Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_results_in_job_order() {
        let jobs = vec![
            DocumentJob::new("one.cs", "a();\n"),
            DocumentJob::new("two.cs", "b();\n"),
            DocumentJob::new("three.cs", "c();\n"),
        ];
        let results = convert_documents(&jobs, &ConvertOptions::default(), |converter, job| {
            Ok(format!("{}:{}", converter.name(), job.source_text.len()))
        });
        let names: Vec<_> = results.into_iter().map(Result::ok).collect();
        assert_eq!(
            names,
            vec![
                Some("one.cs:5".to_owned()),
                Some("two.cs:5".to_owned()),
                Some("three.cs:5".to_owned()),
            ]
        );
    }

    #[test]
    fn test_cancellation_checked_between_documents() {
        let cancel = Arc::new(AtomicBool::new(true));
        let options = ConvertOptions {
            threads: 1,
            cancel: Some(Arc::clone(&cancel)),
        };
        let jobs = vec![DocumentJob::new("one.cs", "a();\n")];
        let results = convert_documents(&jobs, &options, |_, _| Ok(()));
        assert!(matches!(
            results.as_slice(),
            [Err(ConvertError::Cancelled { .. })]
        ));
    }
}
