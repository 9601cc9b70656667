/*!
 * Caption segment processing.
 *
 * - `transformer`: merge, filter, range extraction, search and validation
 * - `formatters`: SRT/WebVTT serialization and display helpers
 */

pub use self::transformer::{CaptionStatistics, CaptionTransformer, SearchMatch, ValidationReport};

pub mod formatters;
pub mod transformer;
