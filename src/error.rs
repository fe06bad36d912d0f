//! Typed error kinds for the sovereignty map engine.
//!
//! Built with `error-chain`, following the teacher crate's dependency on
//! `error-chain` for its error handling.

error_chain::error_chain! {
    foreign_links {
        Io(std::io::Error) #[doc = "snapshot read/write failure"];
    }

    errors {
        /// Owner color length wrong, non-integer id, duplicate id, jump to
        /// an unknown system. Recoverable at load time: the offending item
        /// is dropped and a warning logged.
        InvalidInput(msg: String) {
            description("invalid input")
            display("invalid input: {}", msg)
        }

        /// A system's projected pixel position fell outside the raster.
        /// Recoverable: dropped silently, counted by the caller via logs.
        OutOfBounds {
            description("system projects outside the raster")
        }

        /// `render` was called before `calculate_influence` succeeded and
        /// no data is present to auto-trigger a calculation.
        NotReady {
            description("render called before calculate_influence")
        }

        /// A mutating call was attempted while state did not allow it.
        StateError(msg: String) {
            description("invalid state transition")
            display("invalid state: {}", msg)
        }

        /// A caller-supplied scalar function failed or panicked.
        CallbackError(msg: String) {
            description("callback failed")
            display("callback failed: {}", msg)
        }

        /// Snapshot header magic did not match `"OWN1"`.
        InvalidFormat(msg: String) {
            description("invalid snapshot format")
            display("invalid snapshot format: {}", msg)
        }

        /// Snapshot dimensions do not match the current map.
        ShapeMismatch(expected: (u32, u32), found: (u32, u32)) {
            description("snapshot shape mismatch")
            display("snapshot shape mismatch: expected {:?}, found {:?}", expected, found)
        }

        /// Snapshot data ended before `width * height` pixels were read.
        Truncated {
            description("snapshot data truncated")
        }
    }
}
