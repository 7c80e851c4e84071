use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use orderflow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
  undone: u64,
}

type BenchError = FlowError;

fn step_defs(num_steps: usize) -> Vec<(&'static str, bool, Option<SkipCondition<BenchContext>>)> {
  (0..num_steps)
    .map(|i| (Box::leak(format!("step_{}", i).into_boxed_str()) as &'static str, false, None))
    .collect()
}

fn increment_handler() -> orderflow::Handler<BenchContext, BenchError> {
  Box::new(|ctx: ContextData<BenchContext>| {
    Box::pin(async move {
      ctx.update(|c| c.counter = c.counter.wrapping_add(1));
      Ok(PipelineControl::Continue)
    })
  })
}

fn bench_linear_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("LinearPipeline");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 10] {
    let defs = step_defs(num_steps);
    let mut pipeline = Pipeline::<BenchContext, BenchError>::new("linear", &defs);
    for (name, _, _) in &defs {
      pipeline.on_root(name, increment_handler());
    }
    let pipeline = Arc::new(pipeline);

    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(BenchContext::default()),
        |ctx| {
          let p = pipeline.clone();
          async move { p.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

/// Every step registers a compensator and the last one fails, so a run pays for the full unwind.
fn bench_compensation_unwind(c: &mut Criterion) {
  let mut group = c.benchmark_group("CompensationUnwind");
  let rt = Runtime::new().unwrap();

  for num_steps in [2usize, 5, 10] {
    let defs = step_defs(num_steps);
    let mut pipeline = Pipeline::<BenchContext, BenchError>::new("unwinding", &defs);
    let last = defs[num_steps - 1].0;
    for (name, _, _) in &defs {
      if *name == last {
        pipeline.on_root(name, |_ctx: ContextData<BenchContext>| async move {
          Err::<PipelineControl, _>(FlowError::Internal("fail".to_string()))
        });
      } else {
        pipeline.on_root(name, increment_handler());
      }
      pipeline.compensate_root(name, |ctx: ContextData<BenchContext>| async move {
        ctx.update(|c| c.undone += 1);
        Ok::<(), FlowError>(())
      });
    }
    let pipeline = Arc::new(pipeline);

    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(BenchContext::default()),
        |ctx| {
          let p = pipeline.clone();
          async move { criterion::black_box(p.run(ctx).await.is_err()) }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_registry_dispatch(c: &mut Criterion) {
  let mut group = c.benchmark_group("RegistryDispatch");
  let rt = Runtime::new().unwrap();

  let registry = Arc::new(FlowRegistry::<BenchError>::new());
  let mut p1 = Pipeline::<BenchContext, BenchError>::new("bench", &[("task1", false, None)]);
  p1.on_root("task1", increment_handler());
  registry.register_pipeline(p1);

  #[derive(Clone, Default)]
  struct AnotherContext {
    val: i32,
  }
  let mut p2 = Pipeline::<AnotherContext, BenchError>::new("another", &[("task2", false, None)]);
  p2.on_root("task2", |ctx: ContextData<AnotherContext>| async move {
    ctx.update(|c| c.val += 1);
    Ok::<_, BenchError>(PipelineControl::Continue)
  });
  registry.register_pipeline(p2);

  group.throughput(Throughput::Elements(1));
  group.bench_function("dispatch_bench_context", |b| {
    b.to_async(&rt).iter_batched(
      || ContextData::new(BenchContext::default()),
      |ctx| {
        let reg = registry.clone();
        async move { reg.run(ctx).await.unwrap() }
      },
      criterion::BatchSize::SmallInput,
    );
  });
  group.bench_function("dispatch_another_context", |b| {
    b.to_async(&rt).iter_batched(
      || ContextData::new(AnotherContext::default()),
      |ctx| {
        let reg = registry.clone();
        async move { reg.run(ctx).await.unwrap() }
      },
      criterion::BatchSize::SmallInput,
    );
  });
  group.finish();
}

criterion_group!(
  benches,
  bench_linear_pipeline,
  bench_compensation_unwind,
  bench_registry_dispatch
);
criterion_main!(benches);
