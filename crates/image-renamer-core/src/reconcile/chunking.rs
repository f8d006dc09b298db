/// Split `items` into at most `workers` contiguous, non-empty chunks.
///
/// Chunk size is `max(ceil(len / workers), 1)`, so short inputs produce fewer
/// chunks rather than empty ones and the last chunk may be smaller.
pub fn split_into_chunks<T>(items: &[T], workers: usize) -> Vec<&[T]> {
    let workers = workers.max(1);
    let chunk_size = items.len().div_ceil(workers).max(1);
    items.chunks(chunk_size).collect()
}
