/// Model families for the macrodyn core.
///
/// Each family supplies only its parameter set and equations of motion;
/// steady-state solving and stability classification come unchanged from
/// `macrodyn_core`. Closed-form steady states are exported alongside each
/// family so the numeric pipeline can be cross-checked.
pub mod ramsey;
pub mod solow;
