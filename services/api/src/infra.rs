use chrono::NaiveDate;
use clap::Args;
use joint_assessment::config::AppConfig;
use joint_assessment::error::AppError;
use joint_assessment::workflows::assessment::JointCatalog;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct CatalogArgs {
    /// JSON region catalog to use instead of APP_REGION_CATALOG / the standard catalog
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

impl CatalogArgs {
    pub(crate) fn load(&self) -> Result<Arc<JointCatalog>, AppError> {
        let catalog = match &self.catalog {
            Some(path) => JointCatalog::from_path(path)?,
            None => AppConfig::load()?.assessment.load_catalog()?,
        };
        Ok(Arc::new(catalog))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_trims_and_validates() {
        assert_eq!(
            parse_date(" 2025-10-02 "),
            Ok(NaiveDate::from_ymd_opt(2025, 10, 2).expect("valid date"))
        );
        assert!(parse_date("2025-13-01").is_err());
    }

    #[test]
    fn explicit_catalog_path_errors_propagate() {
        let args = CatalogArgs {
            catalog: Some(PathBuf::from("./does-not-exist.json")),
        };
        assert!(matches!(args.load(), Err(AppError::Catalog(_))));
    }
}
