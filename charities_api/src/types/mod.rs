mod meta;
pub use self::meta::SearchResult;

mod charity;
pub use self::charity::{Charity, CharityStatus};

mod records;
pub use self::records::{FinancialYear, OtherRegulator, Trustee};

mod regulator;
pub use self::regulator::Regulator;
