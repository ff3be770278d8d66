// Error kinds are raised before the core join runs; the core itself
// assumes validated inputs and never constructs these once token vectors,
// the index, and the driver are underway, except for `TokenizationFailed`,
// which surfaces a per-row tokenizer failure as the whole join's failure
// rather than a silently skipped row.
error_chain! {

    foreign_links {
        Fmt(std::fmt::Error)
            #[doc = "A wrapper around `std::fmt::Error`"];
        ParseInt(std::num::ParseIntError)
            #[doc = "A wrapper around `std::num::ParseIntError`"];
        Io(std::io::Error)
            #[doc = "A wrapper around `std::io::Error`"];
        Cli(clap::Error)
            #[doc = "A wrapper around `clap::Error`"] #[cfg(feature = "cli")];
    }

    errors {
        InvalidInputTable(detail: String) {
            description("invalid input table"),
            display("input table is not tabular or could not be read: {}", detail)
        }

        UnknownAttribute(attr: String) {
            description("unknown attribute"),
            display("named column does not exist: '{}'", attr)
        }

        NonTextualJoinAttribute(attr: String) {
            description("join attribute is not textual"),
            display("join attribute '{}' is not a string column", attr)
        }

        InvalidTokenizer(detail: String) {
            description("invalid tokenizer"),
            display("tokenizer is not a valid q-gram tokenizer: {}", detail)
        }

        InvalidThreshold(value: String) {
            description("invalid threshold"),
            display("threshold must be a non-negative number: '{}'", value)
        }

        InvalidComparisonOperator(op: String) {
            description("invalid comparison operator"),
            display("comparison operator must be one of '<=', '<', '=': '{}'", op)
        }

        InvalidOutputAttribute(attr: String) {
            description("invalid output attribute"),
            display("requested output attribute does not exist: '{}'", attr)
        }

        NonUniqueOrMissingKey(detail: String) {
            description("key column is not unique or contains nulls"),
            display("key column violates uniqueness/non-null contract: {}", detail)
        }

        TokenizationFailed(detail: String) {
            description("tokenizer failed on a row"),
            display("tokenizer raised an error while processing a row: {}", detail)
        }
    }
}
