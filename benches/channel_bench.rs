use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use weak_event::{method, WeakCallable, WeakEventChannel};

#[derive(Default)]
struct Sink {
    total: Cell<u64>,
}

impl Sink {
    fn add(&self, v: u64) {
        self.total.set(self.total.get().wrapping_add(v));
    }
}

fn callable(s: &Rc<Sink>) -> WeakCallable<(u64,)> {
    WeakCallable::new(s, method!(Sink, add)).unwrap()
}

fn bench_weak_invoke(c: &mut Criterion) {
    c.bench_function("weak_callable_invoke_live", |b| {
        let s = Rc::new(Sink::default());
        let cb = callable(&s);
        b.iter(|| cb.invoke(black_box((1,))))
    });

    c.bench_function("weak_callable_invoke_dead", |b| {
        let cb = callable(&Rc::new(Sink::default()));
        b.iter(|| cb.invoke(black_box((1,))))
    });
}

fn bench_channel_invoke(c: &mut Criterion) {
    c.bench_function("channel_invoke_1k_live", |b| {
        let sinks: Vec<_> = (0..1_000).map(|_| Rc::new(Sink::default())).collect();
        let ch: WeakEventChannel<(u64,)> = WeakEventChannel::with_capacity(sinks.len());
        for s in &sinks {
            ch.subscribe(callable(s)).unwrap();
        }
        b.iter(|| black_box(ch.invoke((1,))))
    });

    // Half the subscribers die before each pass; measures delivery plus pruning.
    c.bench_function("channel_invoke_1k_half_dead", |b| {
        b.iter_batched(
            || {
                let sinks: Vec<_> = (0..1_000).map(|_| Rc::new(Sink::default())).collect();
                let ch: WeakEventChannel<(u64,)> = WeakEventChannel::with_capacity(sinks.len());
                for s in &sinks {
                    ch.subscribe(callable(s)).unwrap();
                }
                let kept: Vec<_> = sinks.into_iter().step_by(2).collect();
                (ch, kept)
            },
            |(ch, kept)| black_box((ch.invoke((1,)), kept)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_unsubscribe(c: &mut Criterion) {
    c.bench_function("channel_unsubscribe_last_of_1k", |b| {
        b.iter_batched(
            || {
                let sinks: Vec<_> = (0..1_000).map(|_| Rc::new(Sink::default())).collect();
                let ch: WeakEventChannel<(u64,)> = WeakEventChannel::new();
                for s in &sinks {
                    ch.subscribe(callable(s)).unwrap();
                }
                let last = callable(sinks.last().unwrap());
                (ch, sinks, last)
            },
            |(ch, sinks, last)| black_box((ch.unsubscribe(&last).unwrap(), sinks)),
            BatchSize::SmallInput,
        )
    });
}

fn config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = config();
    targets = bench_weak_invoke, bench_channel_invoke, bench_unsubscribe
}
criterion_main!(benches);
