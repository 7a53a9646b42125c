#![allow(unused_macros)]

/// Helper macro for locking items
///
/// Maps a poisoned mutex to [`crate::Error::LockError`] instead of panicking, so that
/// lock failures inside worker threads surface as ordinary decode-pipeline errors.
///
/// ```rust, ignore
///  let mut data = lock!(my_mutex)?;
///  data.some_field = 42;
/// ```
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)
    };
}
