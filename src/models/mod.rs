pub mod reference;
pub mod result;
pub mod sku;

pub use reference::{InvoiceAnchor, MatchMode, RoAssociation};
pub use result::{Diagnostic, DiagnosticKind, EnrichedRecord, ReconcileReport};
pub use sku::{ReturnLineItem, SkuGroup, SkuKey, SKU_KEY_COLUMNS};
