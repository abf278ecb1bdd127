use crate::domain::model::{CellLine, Culture, Vessel};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    /// Bulk request file, relative to the storage root.
    fn input_file(&self) -> &str;
    fn output_path(&self) -> &str;
}

/// Lookup of the reference records a calculation request points at by id.
pub trait CatalogProvider: Send + Sync {
    fn vessels(&self) -> &[Vessel];
    fn cell_lines(&self) -> &[CellLine];
    fn cultures(&self) -> &[Culture];

    fn vessel(&self, id: i64) -> Option<&Vessel> {
        self.vessels().iter().find(|vessel| vessel.id == id)
    }

    fn vessel_by_name(&self, name: &str) -> Option<&Vessel> {
        let name = name.trim();
        self.vessels()
            .iter()
            .find(|vessel| vessel.name.eq_ignore_ascii_case(name))
    }

    fn culture(&self, id: i64) -> Option<&Culture> {
        self.cultures().iter().find(|culture| culture.id == id)
    }

    fn cell_line(&self, id: i64) -> Option<&CellLine> {
        self.cell_lines().iter().find(|line| line.id == id)
    }

    fn cell_line_for_culture(&self, culture_id: i64) -> Option<&CellLine> {
        self.culture(culture_id)
            .and_then(|culture| self.cell_line(culture.cell_line_id))
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Row: Send;
    type Output: Send;

    async fn extract(&self) -> Result<Vec<Self::Row>>;
    async fn transform(&self, rows: Vec<Self::Row>) -> Result<Self::Output>;
    async fn load(&self, output: Self::Output) -> Result<String>;
}
