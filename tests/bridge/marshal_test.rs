//! Value exchange against the stand-in interpreter, whose canned payloads
//! are little-endian.

#![cfg(target_endian = "little")]

use julia_bridge::{BridgeError, ElementKind, JuliaBridge, NumericArray, Value};

fn bridge() -> JuliaBridge {
    JuliaBridge::with_config(crate::fake_config())
}

#[tokio::test]
async fn test_get_int64_scalar() {
    let mut bridge = bridge();
    assert_eq!(bridge.get("x").await.unwrap(), Value::Int64(7));
}

#[tokio::test]
async fn test_get_string_with_quote_and_multibyte_char() {
    let mut bridge = bridge();
    assert_eq!(
        bridge.get("s").await.unwrap(),
        Value::String("a\"\u{3b1}".to_string())
    );
}

#[tokio::test]
async fn test_get_matrix_keeps_column_major_order() {
    let mut bridge = bridge();
    let Value::Array(array) = bridge.get("m").await.unwrap() else {
        panic!("expected an array");
    };

    assert_eq!(array.dims(), &[2, 2]);
    assert_eq!(array.element_kind(), ElementKind::Int32);
    assert!(!array.is_complex());
    let expected = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    assert_eq!(array, expected);
}

#[tokio::test]
async fn test_get_complex_scalar() {
    let mut bridge = bridge();
    assert_eq!(
        bridge.get("z").await.unwrap(),
        Value::Array(NumericArray::complex_scalar(1.5, -2.0))
    );
}

#[tokio::test]
async fn test_get_nothing() {
    let mut bridge = bridge();
    assert_eq!(bridge.get("n").await.unwrap(), Value::Null);
}

#[tokio::test]
async fn test_get_unsupported_type() {
    let mut bridge = bridge();
    match bridge.get("d").await {
        Err(BridgeError::UnsupportedType(name)) => assert_eq!(name, "Dict{Symbol, Any}"),
        other => panic!("expected unsupported type, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_undefined_reports_interpreter_error() {
    let mut bridge = bridge();
    let err = bridge.get("undefined_thing").await.unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
    assert!(err.to_string().contains("UndefVarError"));

    // The session stays usable.
    assert_eq!(bridge.get("x").await.unwrap(), Value::Int64(7));
}

#[tokio::test]
async fn test_get_short_payload() {
    let mut bridge = bridge();
    match bridge.get("short").await {
        Err(BridgeError::ShortRead { expected, received }) => {
            assert_eq!(expected, 8);
            assert_eq!(received, 2);
        }
        other => panic!("expected a short read, got {other:?}"),
    }
}

#[tokio::test]
async fn test_set_writes_literals() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("requests.log");
    let mut bridge = JuliaBridge::with_config(crate::fake_config_logging(&log));

    bridge.set("a", 5i64).await.unwrap();
    bridge.set("k", 3i8).await.unwrap();
    bridge.set("b", 2.5f32).await.unwrap();
    bridge.set("f", f32::NEG_INFINITY).await.unwrap();
    bridge.set("g", f64::NAN).await.unwrap();
    bridge.set("c", "say \"hi\" \\").await.unwrap();
    bridge.set("q", "a\\\"b").await.unwrap();
    bridge.set("n", Value::Null).await.unwrap();
    bridge.set("e", JuliaBridge::complex(1.0, -1.0)).await.unwrap();
    bridge
        .set("w", NumericArray::complex_scalar(0.5, 2.0))
        .await
        .unwrap();
    let array = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    bridge.set("m", array).await.unwrap();

    assert_eq!(
        crate::logged_requests(&log),
        vec![
            r##"a = Int64(5); "__##@@##__""##,
            r##"k = Int8(3); "__##@@##__""##,
            r##"b = Float32(2.5); "__##@@##__""##,
            r##"f = -Float32(__jb_inf__); "__##@@##__""##,
            r##"g = NaN; "__##@@##__""##,
            r##"c = raw"say \"hi\" \\"; "__##@@##__""##,
            r##"q = raw"a\\\"b"; "__##@@##__""##,
            r##"n = nothing; "__##@@##__""##,
            r##"e = complex(1.0, -1.0); "__##@@##__""##,
            r##"w = Complex{Float64}(0.5, 2.0); "__##@@##__""##,
            r##"m = Array{Int32}(undef, 2, 2); read!(stdin, m); "__##@@##__""##,
        ]
    );
}

#[tokio::test]
async fn test_get_skips_output_arriving_after_drain() {
    let mut bridge = bridge();
    bridge.exec("noisy()").await.unwrap();

    assert_eq!(bridge.get("x").await.unwrap(), Value::Int64(7));
    assert_eq!(
        bridge.get("s").await.unwrap(),
        Value::String("a\"\u{3b1}".to_string())
    );
    let expected = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    assert_eq!(bridge.get("m").await.unwrap(), Value::Array(expected));
}

#[tokio::test]
async fn test_set_array_streams_payload() {
    let mut bridge = bridge();
    let array = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    bridge.set("m", array).await.unwrap();
    assert_eq!(bridge.exec("println(after)").await.unwrap(), vec!["after"]);
}

#[tokio::test]
async fn test_eval_fetches_result() {
    let mut bridge = bridge();
    assert_eq!(bridge.eval("3 + 4").await.unwrap(), Value::Int64(7));
}

#[tokio::test]
async fn test_call_binds_array_arguments() {
    let mut bridge = bridge();
    let array = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    let result = bridge
        .call("sum", &[Value::Array(array), 1i64.into()])
        .await
        .unwrap();
    assert_eq!(result, Value::Int64(7));
}

#[tokio::test]
async fn test_call_with_expression_argument() {
    let mut bridge = bridge();
    let result = bridge
        .call("identity", &[JuliaBridge::expr("x").into()])
        .await
        .unwrap();
    assert_eq!(result, Value::Int64(7));
}

#[tokio::test]
async fn test_eval_reports_thrown_error() {
    let mut bridge = bridge();
    let err = bridge.eval("error(\"boom\")").await.unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
    assert!(err.to_string().contains("boom"));

    // The session stays usable.
    assert_eq!(bridge.eval("1").await.unwrap(), Value::Int64(7));
}

#[tokio::test]
async fn test_call_reports_thrown_error_and_releases_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("requests.log");
    let mut bridge = JuliaBridge::with_config(crate::fake_config_logging(&log));

    let array = NumericArray::new(vec![2, 2], vec![1i32, 2, 3, 4], false).unwrap();
    let err = bridge
        .call("undefined_fn", &[Value::Array(array), 1i64.into()])
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Protocol(_)));
    assert!(err.to_string().contains("undefined_fn"));

    let requests = crate::logged_requests(&log);
    assert_eq!(
        requests,
        vec![
            r##"__jb_arg0__ = Array{Int32}(undef, 2, 2); read!(stdin, __jb_arg0__); "__##@@##__""##,
            r##"__jb_ans__ = undefined_fn(__jb_arg0__, Int64(1)); "__##@@##__""##,
            r##"__jb_arg0__ = nothing; "__##@@##__""##,
        ]
    );
}
