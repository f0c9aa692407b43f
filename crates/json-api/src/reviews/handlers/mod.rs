pub(crate) mod create;
pub(crate) mod eligibility;
pub(crate) mod index;
pub(crate) mod pending;
pub(crate) mod status;
