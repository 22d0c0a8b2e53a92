pub mod merge;
pub mod scan;
pub mod trip;

pub use merge::merge;
pub use scan::{apply_scan, build_inspection, CaptureError, CaptureInput, ScanContext, ScanOutcome};
pub use trip::{create_trip, TripError, TripOutcome, TripSelection};
