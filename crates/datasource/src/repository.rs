use crate::DataSourceError;
use chrono::{DateTime, Utc};
use configuration::DataSettings;
use core_types::{ChartType, SalesRecord};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// The `FixtureRepository` holds the records of every chart type in memory.
/// Cloning is cheap; the record vectors are shared.
#[derive(Debug, Clone)]
pub struct FixtureRepository {
    datasets: HashMap<ChartType, Arc<Vec<SalesRecord>>>,
    loaded_at: DateTime<Utc>,
}

/// A row of the dataset listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub chart_type: ChartType,
    pub slug: &'static str,
    pub records: usize,
}

impl FixtureRepository {
    /// Reads the fixture of every chart type. Any missing or malformed file
    /// fails the whole load.
    pub async fn load(settings: &DataSettings) -> Result<Self, DataSourceError> {
        let mut datasets = HashMap::new();
        for chart in ChartType::ALL {
            let path = settings.path_for(chart);
            let records = read_fixture(&path).await?;
            tracing::info!(
                chart = %chart,
                path = %path.display(),
                records = records.len(),
                "Loaded fixture."
            );
            datasets.insert(chart, Arc::new(records));
        }

        Ok(Self {
            datasets,
            loaded_at: Utc::now(),
        })
    }

    /// Builds a repository from records already in memory. Chart types that
    /// are not supplied have no records.
    pub fn from_records(datasets: impl IntoIterator<Item = (ChartType, Vec<SalesRecord>)>) -> Self {
        Self {
            datasets: datasets
                .into_iter()
                .map(|(chart, records)| (chart, Arc::new(records)))
                .collect(),
            loaded_at: Utc::now(),
        }
    }

    pub fn records(&self, chart: ChartType) -> &[SalesRecord] {
        self.datasets
            .get(&chart)
            .map(|records| records.as_slice())
            .unwrap_or_default()
    }

    /// One summary per chart type, in selector order.
    pub fn summaries(&self) -> Vec<DatasetSummary> {
        ChartType::ALL
            .into_iter()
            .map(|chart| DatasetSummary {
                chart_type: chart,
                slug: chart.slug(),
                records: self.records(chart).len(),
            })
            .collect()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

async fn read_fixture(path: &Path) -> Result<Vec<SalesRecord>, DataSourceError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| DataSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| DataSourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
