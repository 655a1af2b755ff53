pub mod dates;
pub mod model;
pub mod period;
pub mod resolve;

pub use dates::{normalize_dates, parse_iso_date};
pub use model::{Client, ExtractedFields, ExtractionRequest, Locality, NewProject, Project};
pub use period::{PeriodParseError, ReferencePeriod};
pub use resolve::{match_client, match_locality};
