// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_placement::geometry::rect_from_xywh;
use understory_placement::headless::Scene;
use understory_placement::modifiers::default_modifiers;
use understory_placement::overflow::{DetectOverflowOptions, detect_overflow};
use understory_placement::{
    ElementId, Elements, Instance, ModifierDescriptor, Options, Phase, Placement, TaskQueue,
    order_modifiers,
};

const REFERENCE: ElementId = ElementId(1);
const POPPER: ElementId = ElementId(2);

/// Names for synthetic modifiers; descriptors need `'static` names.
fn leak_name(i: usize) -> &'static str {
    Box::leak(format!("synthetic_{i}").into_boxed_str())
}

/// A chain where every modifier requires the previous one, declared in reverse.
fn gen_chain(names: &[&'static str]) -> Vec<ModifierDescriptor> {
    let phases = [Phase::Read, Phase::Main, Phase::AfterMain, Phase::BeforeWrite];
    let mut out = Vec::with_capacity(names.len());
    for (i, &name) in names.iter().enumerate().rev() {
        let mut m = ModifierDescriptor::new(name, phases[i % phases.len()]);
        if i > 0 {
            m = m.with_requires_if_exists(&[names[i - 1]]);
        }
        out.push(m);
    }
    out
}

fn scene(viewport_height: f64) -> std::rc::Rc<Scene> {
    let scene = Scene::new(rect_from_xywh(0.0, 0.0, 800.0, viewport_height));
    scene.set_rect(REFERENCE, rect_from_xywh(380.0, 300.0, 40.0, 20.0));
    scene.set_rect(POPPER, rect_from_xywh(0.0, 0.0, 160.0, 120.0));
    scene
}

fn bench_resolver(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolver");
    let defaults = default_modifiers();
    group.bench_function("default_set", |b| {
        b.iter(|| order_modifiers(black_box(&defaults)));
    });
    for &n in &[16usize, 64, 256] {
        let names: Vec<_> = (0..n).map(leak_name).collect();
        let chain = gen_chain(&names);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("reversed_chain_n{n}"), |b| {
            b.iter(|| order_modifiers(black_box(&chain)));
        });
    }
    group.finish();
}

fn bench_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("pass");
    // 600 tall fits below; 400 tall forces a flip and one restart.
    for (label, height) in [("fits", 600.0), ("flips", 400.0)] {
        let scene = scene(height);
        let headless = Instance::new(
            Elements::new(REFERENCE, POPPER),
            Options::default().with_placement(Placement::BOTTOM),
            scene.headless_platform(),
            TaskQueue::new(),
        )
        .unwrap();
        group.bench_function(format!("headless_{label}"), |b| {
            b.iter(|| headless.force_update());
        });

        let writing = Instance::new(
            Elements::new(REFERENCE, POPPER),
            Options::default().with_placement(Placement::BOTTOM),
            scene.platform(),
            TaskQueue::new(),
        )
        .unwrap();
        group.bench_function(format!("with_writer_{label}"), |b| {
            b.iter(|| writing.force_update());
        });
    }
    group.finish();
}

fn bench_coalesced_updates(c: &mut Criterion) {
    let scene = scene(600.0);
    c.bench_function("coalesced_update_x32", |b| {
        b.iter_batched(
            || {
                let queue = TaskQueue::new();
                let instance = Instance::new(
                    Elements::new(REFERENCE, POPPER),
                    Options::default(),
                    scene.headless_platform(),
                    queue.clone(),
                )
                .unwrap();
                queue.run_pending();
                (instance, queue)
            },
            |(instance, queue)| {
                for _ in 0..32 {
                    let _ = black_box(instance.update());
                }
                queue.run_pending()
            },
            BatchSize::SmallInput,
        );
    });
}

fn bench_detect_overflow(c: &mut Criterion) {
    let scene = scene(400.0);
    let instance = Instance::new(
        Elements::new(REFERENCE, POPPER),
        Options::default(),
        scene.headless_platform(),
        TaskQueue::new(),
    )
    .unwrap();
    let state = instance.force_update().unwrap();
    let mut group = c.benchmark_group("detect_overflow");
    for placement in [Placement::BOTTOM, Placement::TOP_START, Placement::LEFT_END] {
        let options = DetectOverflowOptions {
            placement: Some(placement),
            ..DetectOverflowOptions::default()
        };
        group.bench_function(placement.to_string(), |b| {
            b.iter(|| detect_overflow(black_box(&state), &*scene, &options));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolver,
    bench_pass,
    bench_coalesced_updates,
    bench_detect_overflow
);
criterion_main!(benches);
