// This is a metapackage for the cross-crate integration tests in tests/.
// The workspace member crates are pulled in as regular dependencies so the
// stress tests can drive the ledger and the matching engine together.
