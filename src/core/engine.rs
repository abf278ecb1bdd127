use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

pub struct PlanningEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PlanningEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting bulk seeding plan");

        let rows = self.pipeline.extract().await?;
        tracing::info!("Read {} requests", rows.len());

        let output = self.pipeline.transform(rows).await?;
        tracing::info!("Planned all requests");

        let output_path = self.pipeline.load(output).await?;
        tracing::info!("Plan saved to: {}", output_path);

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::CalcError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPipeline {
        loads: AtomicUsize,
        fail_transform: bool,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        type Row = u32;
        type Output = u32;

        async fn extract(&self) -> Result<Vec<u32>> {
            Ok(vec![1, 2, 3])
        }

        async fn transform(&self, rows: Vec<u32>) -> Result<u32> {
            if self.fail_transform {
                return Err(CalcError::validation("bad batch"));
            }
            Ok(rows.iter().sum())
        }

        async fn load(&self, output: u32) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("total-{}", output))
        }
    }

    #[tokio::test]
    async fn test_run_passes_rows_through_every_phase() {
        let engine = PlanningEngine::new(CountingPipeline {
            loads: AtomicUsize::new(0),
            fail_transform: false,
        });

        assert_eq!(engine.run().await.unwrap(), "total-6");
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_stops_before_load_on_error() {
        let engine = PlanningEngine::new(CountingPipeline {
            loads: AtomicUsize::new(0),
            fail_transform: true,
        });

        assert!(engine.run().await.is_err());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
