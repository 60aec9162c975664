/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Parallelism helpers shared by the engines.

mod granularity;
pub use granularity::Granularity;

/// Creates a Rayon thread pool with the given number of threads.
///
/// # Panics
///
/// If the thread pool cannot be created.
pub fn thread_pool(num_threads: usize) -> rayon::ThreadPool {
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .expect("Failed to create thread pool");
    log::info!("Using {} threads", thread_pool.current_num_threads());
    thread_pool
}
