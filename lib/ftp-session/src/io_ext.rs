/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncBufRead;

pub(crate) trait LimitedBufReadExt: AsyncBufRead {
    /// Read until `delimiter` is found, at most `max_len` bytes.
    ///
    /// Returns whether the delimiter was found and how many bytes were
    /// appended to `buf`. Zero bytes means the peer has closed the stream.
    fn limited_read_until<'a>(
        &'a mut self,
        delimiter: u8,
        max_len: usize,
        buf: &'a mut Vec<u8>,
    ) -> LimitedReadUntil<'a, Self>
    where
        Self: Unpin,
    {
        LimitedReadUntil {
            reader: self,
            delimiter,
            max_len,
            buf,
            read: 0,
        }
    }
}

impl<R: AsyncBufRead + ?Sized> LimitedBufReadExt for R {}

pub(crate) struct LimitedReadUntil<'a, R: ?Sized> {
    reader: &'a mut R,
    delimiter: u8,
    max_len: usize,
    buf: &'a mut Vec<u8>,
    read: usize,
}

impl<R: AsyncBufRead + ?Sized + Unpin> Future for LimitedReadUntil<'_, R> {
    type Output = io::Result<(bool, usize)>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Self {
            reader,
            delimiter,
            max_len,
            buf,
            read,
        } = &mut *self;

        loop {
            let (found, used) = {
                let available = ready!(Pin::new(&mut **reader).poll_fill_buf(cx))?;
                if available.is_empty() {
                    return Poll::Ready(Ok((false, *read)));
                }

                let left = *max_len - *read;
                let to_search = if available.len() > left {
                    &available[..left]
                } else {
                    available
                };
                match memchr::memchr(*delimiter, to_search) {
                    Some(i) => {
                        buf.extend_from_slice(&to_search[..=i]);
                        (true, i + 1)
                    }
                    None => {
                        buf.extend_from_slice(to_search);
                        (false, to_search.len())
                    }
                }
            };
            Pin::new(&mut **reader).consume(used);
            *read += used;
            if found || *read >= *max_len {
                return Poll::Ready(Ok((found, *read)));
            }
        }
    }
}
