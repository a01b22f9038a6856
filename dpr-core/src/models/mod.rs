mod asset_item;
mod cell_address;
mod cell_value;
mod section;
mod tenure_bracket;

pub use asset_item::{AssetField, AssetItem};
pub use cell_address::{CellAddress, CellAddressError};
pub use cell_value::CellValue;
pub use section::{SectionData, SectionId, WizardState};
pub use tenure_bracket::{TENURE_THRESHOLD_YEARS, TenureBracket};
