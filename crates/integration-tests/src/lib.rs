//! Black-box tests for the analysis gateway router. The tests live under
//! `tests/` and share helpers from `tests/support`.
