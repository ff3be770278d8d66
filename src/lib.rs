#[macro_use]
extern crate error_chain;
#[cfg(feature = "cli")]
#[macro_use]
extern crate log;

#[cfg(feature = "cli")]
#[doc(hidden)]
pub(crate) mod cli;
#[doc(hidden)]
pub(crate) mod errors;
#[doc(inline)]
pub mod index;
#[doc(inline)]
pub mod matching;
#[doc(inline)]
pub mod missing;
#[doc(inline)]
pub mod options;
#[doc(inline)]
pub mod output;
#[doc(inline)]
pub mod qgram;
#[doc(inline)]
pub mod token;
#[doc(inline)]
pub mod validate;
#[doc(inline)]
pub mod verification;

#[doc(hidden)]
pub(crate) mod distance;
