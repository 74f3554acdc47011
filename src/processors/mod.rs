pub mod columnar;
pub mod mesh_generator;
pub mod pipeline;
pub mod run_report;
pub mod zone_reconciler;

pub use columnar::{batch_to_records, records_to_batch, schema_for};
pub use mesh_generator::generate_mesh;
pub use pipeline::Pipeline;
pub use run_report::RunReport;
pub use zone_reconciler::{reconcile_zones, Reconciliation, ZoneTable};
