// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Engine error types.
//!
//! The engine is deliberately hard to kill: malformed records degrade to
//! sentinels and missing side-channels to fallbacks. The only unrecoverable
//! condition is having no activity history at all.

use thiserror::Error;

/// Errors the brief generator can return.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No activity history was provided; there is nothing to analyze.
    #[error("no activity history available")]
    NoActivityData,
}
