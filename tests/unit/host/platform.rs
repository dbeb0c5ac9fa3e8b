use super::*;

#[test]
fn live_hosts_share_one_platform() {
    let a = ScriptPlatform::acquire();
    let b = ScriptPlatform::acquire();
    assert!(Arc::ptr_eq(&a, &b));
}
