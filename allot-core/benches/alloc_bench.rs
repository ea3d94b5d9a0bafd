#[macro_use]
extern crate criterion;

use criterion::Criterion;

use allot_core::alloc::{Allocator, NewDeleteAllocator, TestAllocator};
use allot_core::string::AllocString;

fn bench_allocate_deallocate(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocate_deallocate");
    let test_allocator = TestAllocator::new("bench");
    let allocators: [(&str, &dyn Allocator); 2] = [
        ("new_delete", NewDeleteAllocator::singleton()),
        ("test", &test_allocator),
    ];

    for (name, alloc) in allocators {
        for size in [16usize, 256, 4096] {
            group.bench_function(format!("{}_{}", name, size), |b| {
                b.iter(|| {
                    let ptr = alloc.allocate(size).unwrap();
                    unsafe { alloc.deallocate(ptr) };
                });
            });
        }
    }
    group.finish();
}

fn bench_string_assign(c: &mut Criterion) {
    let alloc = NewDeleteAllocator::singleton();
    c.bench_function("alloc_string_assign_long", |b| {
        let mut s = AllocString::new_in(alloc);
        b.iter(|| {
            s.assign("a description long enough to leave the inline buffer")
                .unwrap();
            s.clear();
        });
    });
}

criterion_group!(benches, bench_allocate_deallocate, bench_string_assign);
criterion_main!(benches);
