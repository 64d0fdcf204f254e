use thiserror::Error;

/// Raised when [`align_to`] is asked to align to a non-power-of-two.
///
/// The front end is expected to only ever hand the back end power-of-two
/// alignments (every scalar and every aggregate's alignment is one), so in
/// practice this is a defect in the caller rather than something a
/// conforming program can trigger.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("alignment {0} is not a positive power of two")]
pub struct AlignError(pub i64);

/// Rounds `n` up to the nearest multiple of `align`.
///
/// `align` must be a positive power of two; this mirrors the collaborator
/// interface named in the back end's external-interfaces contract, but is
/// implemented here directly since memory layout depends on it on every
/// offset assignment.
pub fn align_to(n: i64, align: i64) -> Result<i64, AlignError> {
    if align <= 0 || (align & (align - 1)) != 0 {
        return Err(AlignError(align));
    }
    Ok((n + align - 1) & !(align - 1))
}
