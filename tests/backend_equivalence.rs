use std::fs;
use std::sync::Arc;

use csv_backend_bench::backend::{
    BackendLoader, InterpretedBackend, InterpretedOptions, NativeBackend, NativeOptions,
    ParseBackend, Readiness,
};
use csv_backend_bench::execution::{Harness, RunStatus};
use csv_backend_bench::ingestion::ParseOptions;
use csv_backend_bench::types::{Backend, ParsedRecord};
use csv_backend_bench::{BackendError, RunError};
use futures::executor::block_on;

fn loaded_native(opts: NativeOptions) -> Arc<NativeBackend> {
    let native = Arc::new(NativeBackend::new(opts));
    native.load().unwrap();
    native
}

fn both(text: &str) -> (Vec<ParsedRecord>, Vec<ParsedRecord>) {
    let native = loaded_native(NativeOptions::default());
    let interpreted = InterpretedBackend::default();
    (
        block_on(native.parse(text)).unwrap(),
        block_on(interpreted.parse(text)).unwrap(),
    )
}

#[test]
fn backends_agree_on_fixture() {
    let text = fs::read_to_string("tests/fixtures/people.csv").unwrap();
    let (native, interpreted) = both(&text);
    assert_eq!(native.len(), 7);
    assert_eq!(native, interpreted);
}

#[test]
fn backends_agree_on_awkward_inputs() {
    let cases = [
        "age\n5\n\n7\nabc\n",
        " age \n1\n2\n",
        "x,age,age\n1,2,3\n",
        "x,age\n1\n2,3,4,5\n",
        "\n\nage\r\n4\r\n\r\n6\r\n",
        "age\n\"1\n2\"\n\"3\"\n",
        "age\n   \n,\n",
        "name\nAda\n",
        "age\n",
    ];
    for text in cases {
        let (native, interpreted) = both(text);
        assert_eq!(native, interpreted, "input {text:?}");
    }
}

#[test]
fn backends_agree_with_custom_delimiter_and_parallel_native_path() {
    let parse = ParseOptions {
        delimiter: b'\t',
        ..Default::default()
    };
    let native = loaded_native(NativeOptions {
        parse,
        num_threads: Some(3),
        parallel_min_rows: 8,
    });
    let interpreted = InterpretedBackend::new(InterpretedOptions {
        parse,
        yield_every: 5,
    });

    let mut text = String::from("id\tage\n");
    for i in 0..200 {
        match i % 7 {
            0 => text.push_str(&format!("{i}\tnope\n")),
            1 => text.push('\n'),
            _ => text.push_str(&format!("{i}\t{}\n", i % 120)),
        }
    }

    let n = block_on(native.parse(&text)).unwrap();
    let i = block_on(interpreted.parse(&text)).unwrap();
    assert_eq!(n, i);
    assert!(n.iter().any(ParsedRecord::is_null));
    assert!(n.iter().any(|r| r.fib_age() == Some(55)));
}

#[test]
fn native_backend_before_load_is_not_ready() {
    let native = NativeBackend::default();
    assert_eq!(native.readiness(), Readiness::Uninitialized);
    let err = block_on(native.parse("age\n1\n")).unwrap_err();
    assert!(matches!(err, BackendError::NotReady { .. }));
    assert_eq!(err.to_string(), "native backend is not ready (state: uninitialized)");
}

#[test]
fn harness_compare_reports_equivalence() {
    let mut harness = Harness::new(
        loaded_native(NativeOptions::default()),
        InterpretedBackend::default(),
    );
    let cmp = harness.compare_blocking("age\n5\n\n7\nabc\n");

    assert!(cmp.records_match());
    assert_eq!(cmp.native.backend, Backend::Native);
    assert_eq!(cmp.interpreted.backend, Backend::Interpreted);
    assert_eq!(cmp.native.columns(), vec!["age", "fib_age"]);
    assert!(cmp.native.elapsed_ms().is_some());

    assert_eq!(harness.last_result(Backend::Native), Some(&cmp.native));
    assert_eq!(harness.last_result(Backend::Interpreted), Some(&cmp.interpreted));
}

#[test]
fn harness_compare_with_unloaded_native_does_not_match() {
    let mut harness = Harness::new(Arc::new(NativeBackend::default()), InterpretedBackend::default());
    let cmp = harness.compare_blocking("age\n1\n");
    assert_eq!(
        cmp.native.status,
        RunStatus::Failure(RunError::BackendNotReady {
            state: Readiness::Uninitialized
        })
    );
    assert!(cmp.interpreted.status.is_success());
    assert!(!cmp.records_match());
    assert_eq!(cmp.speedup(), None);
}

#[test]
fn header_only_input_succeeds_with_no_records_on_both_backends() {
    let mut harness = Harness::new(
        loaded_native(NativeOptions::default()),
        InterpretedBackend::default(),
    );
    for backend in Backend::ALL {
        let result = harness.run_blocking("age\n", backend);
        assert_eq!(result.status, RunStatus::Success);
        assert!(result.records.is_empty());
        assert!(result.columns().is_empty());
    }
}

#[test]
fn backends_agree_whether_or_not_values_are_trimmed() {
    let text = "name, age \nAda, 5 \nBob,6\nCy,\t7\nDi,  \n";
    let mut outputs = Vec::new();
    for trim_values in [true, false] {
        let parse = ParseOptions {
            trim_values,
            ..Default::default()
        };
        let native = loaded_native(NativeOptions {
            parse,
            ..Default::default()
        });
        let interpreted = InterpretedBackend::new(InterpretedOptions {
            parse,
            ..Default::default()
        });
        let n = block_on(native.parse(text)).unwrap();
        let i = block_on(interpreted.parse(text)).unwrap();
        assert_eq!(n, i, "trim_values = {trim_values}");
        outputs.push(n);
    }

    let null = ParsedRecord::null();
    assert_eq!(
        outputs[0],
        vec![ParsedRecord::new(5, 5), ParsedRecord::new(6, 8), ParsedRecord::new(7, 13), null]
    );
    assert_eq!(outputs[1], vec![null, ParsedRecord::new(6, 8), null, null]);
}
