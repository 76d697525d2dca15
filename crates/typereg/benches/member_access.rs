// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member Access Benchmark
//!
//! Measures the wrapper-layer overhead of dynamic member access:
//! - compiled (direct delegate) vs reflective property reads/writes
//! - method invocation through count-based overload resolution
//! - instance activation through the pre-bound constructor delegate
//!
//! The compiled/reflective gap is the number that justifies the
//! accessor cache; run with `cargo bench --bench member_access`.

#![allow(clippy::uninlined_format_args)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::sync::Arc;
use typereg::{NativeType, TypeBuilder, TypeRef, TypeRegistry, Value};

// Two distinct Rust types: wrappers are cached per type identity, so
// the reflective and compiled routes need separate descriptors.
struct Sample {
    value: f64,
}

struct FastSample {
    value: f64,
}

fn reflective_type() -> Arc<NativeType> {
    TypeBuilder::of::<Sample>("bench.Reflective")
        .property(
            "value",
            TypeRef::of::<f64>(),
            |s: &Sample| s.value,
            |s: &mut Sample, v: f64| s.value = v,
        )
        .build()
}

fn compiled_type() -> Arc<NativeType> {
    TypeBuilder::of::<FastSample>("bench.Compiled")
        .property_compiled(
            "value",
            TypeRef::of::<f64>(),
            |s: &FastSample| s.value,
            |s: &mut FastSample, v: f64| s.value = v,
        )
        .build()
}

fn bench_property_read(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    let reflective = registry.get_type_info(&reflective_type());
    let compiled = registry.get_type_info(&compiled_type());
    let mut group = c.benchmark_group("property_read");
    group.bench_function("reflective", |b| {
        let prop = reflective.property("value").expect("value").clone();
        let sample = Sample { value: 1.5 };
        b.iter(|| black_box(prop.get_value(black_box(&sample)).expect("get")));
    });
    group.bench_function("compiled", |b| {
        let prop = compiled.property("value").expect("value").clone();
        let sample = FastSample { value: 1.5 };
        b.iter(|| black_box(prop.get_value(black_box(&sample)).expect("get")));
    });
    group.finish();
}

fn bench_property_write(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    let reflective = registry.get_type_info(&reflective_type());
    let compiled = registry.get_type_info(&compiled_type());

    let mut group = c.benchmark_group("property_write");
    group.bench_function("reflective", |b| {
        let prop = reflective.property("value").expect("value").clone();
        let mut sample = Sample { value: 0.0 };
        b.iter(|| prop.set_value(&mut sample, black_box(Value::F64(2.5))).expect("set"));
    });
    group.bench_function("compiled", |b| {
        let prop = compiled.property("value").expect("value").clone();
        let mut sample = FastSample { value: 0.0 };
        b.iter(|| prop.set_value(&mut sample, black_box(Value::F64(2.5))).expect("set"));
    });
    group.finish();
}

fn bench_invoke_and_activate(c: &mut Criterion) {
    let registry = TypeRegistry::new();
    struct Counter {
        n: i64,
    }
    let info = registry.get_type_info(
        &TypeBuilder::of::<Counter>("bench.Counter")
            .method1(
                "bump",
                ("delta", TypeRef::of::<i64>()),
                TypeRef::of::<i64>(),
                |c: &mut Counter, delta: i64| {
                    c.n += delta;
                    c.n
                },
            )
            .constructor1(("n", TypeRef::of::<i64>()), |n: i64| Counter { n })
            .build(),
    );

    c.bench_function("invoke_by_count", |b| {
        let mut counter = Counter { n: 0 };
        b.iter(|| {
            info.invoke(&mut counter, "bump", black_box(&[Value::I64(1)]))
                .expect("invoke")
        });
    });

    c.bench_function("create_instance", |b| {
        b.iter(|| {
            black_box(
                info.create_instance(black_box(&[Value::I64(7)]))
                    .expect("create"),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_property_read,
    bench_property_write,
    bench_invoke_and_activate
);
criterion_main!(benches);
