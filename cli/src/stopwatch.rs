/*
 * This file is a part of the tracecache project.
*/

//! Phase timing, grounded on the teacher's `LoopMonitor`/`devtimer::SimpleTimer` pairing: wrap a
//! unit of work, log its name on entry and its elapsed time on completion.

use devtimer::SimpleTimer;

/// Runs `phase` under a named [`SimpleTimer`], logging entry and elapsed-nanosecond completion
/// at `info!` level. Purely observational: the return value is passed through unchanged.
pub fn timed<T>(name: &str, phase: impl FnOnce() -> T) -> T {
    log::info!("{name}: starting");
    let mut timer = SimpleTimer::new();
    timer.start();
    let result = phase();
    timer.stop();
    log::info!(
        "{name}: done in {}ns",
        timer.time_in_nanos().unwrap_or_default()
    );
    result
}
