//! Static work partitioning for the renderer.
//!
//! The image is cut into fixed-size runs of consecutive pixels (chunks) in
//! row-major order. Chunks are dealt out round-robin: task `i` of `T` owns
//! chunks `i, i + T, i + 2T, ...`. Every pixel belongs to exactly one task,
//! and each task gets mutable access to its own pixels only.

/// A run of consecutive pixels owned by one task.
#[derive(Debug)]
pub struct Chunk<'a, T> {
    /// Row-major index of the first pixel.
    pub start: usize,
    pub pixels: &'a mut [T],
}

/// Split `pixels` into chunks of `chunk_size` and deal them to `task_count`
/// tasks.
///
/// The last chunk may be shorter. Tasks that receive no chunk get an empty
/// list.
///
/// # Panics
///
/// Panics if `chunk_size` or `task_count` is zero.
pub fn partition_chunks<T>(
    pixels: &mut [T],
    chunk_size: usize,
    task_count: usize,
) -> Vec<Vec<Chunk<'_, T>>> {
    assert!(chunk_size > 0, "chunk size must be positive");
    assert!(task_count > 0, "task count must be positive");

    let mut tasks: Vec<Vec<Chunk<'_, T>>> = (0..task_count).map(|_| Vec::new()).collect();
    for (index, pixels) in pixels.chunks_mut(chunk_size).enumerate() {
        tasks[chunk_owner(index, task_count)].push(Chunk {
            start: index * chunk_size,
            pixels,
        });
    }
    tasks
}

/// Task that owns chunk `chunk_index`.
#[inline]
pub fn chunk_owner(chunk_index: usize, task_count: usize) -> usize {
    chunk_index % task_count
}

/// Number of chunks needed to cover `pixel_count` pixels.
#[inline]
pub fn chunk_count(pixel_count: usize, chunk_size: usize) -> usize {
    pixel_count.div_ceil(chunk_size)
}
