/*! Integration tests for Concordia.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the library surface:
 * - doc: document lifecycle, map/register writes, the operation engine
 * - sets: set insert/delete semantics and idempotence
 * - gc: recursive retirement of nested CRDT subtrees
 * - convergence: replica convergence and deterministic tie-breaking
 * - wire: operation and snapshot serialization fidelity
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("concordia=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod convergence;
mod gc;
