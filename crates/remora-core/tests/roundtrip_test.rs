//! Cross-kind properties: artifact round-trips and schema completeness
//! hold for every hook kind in the registry, not just the ones the other
//! tests happen to touch.

use serde_json::json;

use remora_core::hook::{self, CaptureMode, HookKind, spec_for};
use remora_core::store::ArtifactStore;

use remora_test_utils::sample_payload;

#[test]
fn every_kind_round_trips_through_the_store() {
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());

    for kind in HookKind::ALL {
        let payload = sample_payload(kind);
        let path = store
            .write(kind, CaptureMode::Programmatic, &payload)
            .unwrap();
        let back = store.read(&path).unwrap();

        for (key, value) in payload.as_object().unwrap() {
            assert_eq!(
                back.get(key),
                Some(value),
                "{kind}: field {key} did not round-trip"
            );
        }
    }
}

#[test]
fn every_kind_sample_payload_is_schema_valid() {
    for kind in HookKind::ALL {
        let report = hook::validate(kind, &sample_payload(kind));
        assert!(
            report.valid,
            "{kind}: failed fields {:?}",
            report.failed_fields()
        );
    }
}

#[test]
fn removing_any_required_field_invalidates_every_kind() {
    for kind in HookKind::ALL {
        let payload = sample_payload(kind);
        for spec in spec_for(kind) {
            let mut stripped = payload.clone();
            stripped.as_object_mut().unwrap().remove(spec.name);
            let report = hook::validate(kind, &stripped);
            if spec.optional {
                assert!(
                    report.valid,
                    "{kind}: removing optional {} should not invalidate",
                    spec.name
                );
            } else {
                assert!(
                    !report.valid,
                    "{kind}: removing required {} should invalidate",
                    spec.name
                );
            }
        }
    }
}

#[test]
fn artifacts_validate_after_the_store_adds_its_bookkeeping() {
    // capture_mode and logged_at are unknown to every schema; they must be
    // ignored, not flagged.
    let tmp = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(tmp.path());

    for kind in HookKind::ALL {
        let path = store
            .write(kind, CaptureMode::Declarative, &sample_payload(kind))
            .unwrap();
        let back = store.read(&path).unwrap();
        assert_eq!(back["capture_mode"], json!("declarative"));
        assert!(hook::validate(kind, &back).valid, "{kind}");
    }
}
