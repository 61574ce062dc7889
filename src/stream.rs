//! A lazy result stream: records are pulled from the server in batches of
//! `fetch_size` as the caller consumes them, never materialised all at once.

use crate::bolt::connection::{to_record, Connection};
use crate::error::BoltError;
use crate::record::Record;
use crate::summary::Summary;
use std::sync::Arc;

/// Cursor over the rows of one statement's result. Buffers at most one
/// `fetch_size` batch at a time; `max_rows` (if set) is an absolute cap
/// across the whole stream, enforced by truncating the last `PULL`.
pub struct RecordStream {
    connection: Connection,
    keys: Arc<Vec<String>>,
    fetch_size: u32,
    max_rows: Option<u64>,
    buffer: std::collections::VecDeque<Vec<crate::value::Value>>,
    rows_yielded: u64,
    has_more: bool,
    exhausted: bool,
    summary: Option<Summary>,
}

impl RecordStream {
    pub(crate) fn new(
        connection: Connection,
        keys: Arc<Vec<String>>,
        fetch_size: u32,
        max_rows: Option<u64>,
    ) -> Self {
        RecordStream {
            connection,
            keys,
            fetch_size,
            max_rows,
            buffer: std::collections::VecDeque::new(),
            rows_yielded: 0,
            has_more: true,
            exhausted: false,
            summary: None,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    fn remaining_budget(&self) -> i64 {
        match self.max_rows {
            Some(limit) if limit >= self.rows_yielded => (limit - self.rows_yielded) as i64,
            Some(_) => 0,
            None => self.fetch_size as i64,
        }
    }

    async fn fill_buffer(&mut self) -> Result<(), BoltError> {
        if self.exhausted || !self.buffer.is_empty() {
            return Ok(());
        }
        let budget = self.remaining_budget();
        if budget <= 0 {
            self.exhausted = true;
            self.has_more = false;
            return Ok(());
        }
        let n = budget.min(self.fetch_size as i64);
        let outcome = self.connection.pull(n).await?;
        self.has_more = outcome.has_more;
        if let Some(summary) = outcome.summary {
            self.summary = Some(summary);
        }
        if !self.has_more {
            self.exhausted = true;
        }
        self.buffer.extend(outcome.records);
        Ok(())
    }

    /// Yield the next row, or `None` once the stream and the server have
    /// both agreed there is nothing left.
    pub async fn next(&mut self) -> Result<Option<Record>, BoltError> {
        if self.buffer.is_empty() {
            self.fill_buffer().await?;
        }
        match self.buffer.pop_front() {
            Some(values) => {
                self.rows_yielded += 1;
                Ok(Some(to_record(self.keys.clone(), values)))
            }
            None => Ok(None),
        }
    }

    /// Abandon the remainder of the stream with `DISCARD` rather than
    /// pulling (and discarding) rows one batch at a time.
    pub async fn discard_rest(&mut self) -> Result<(), BoltError> {
        if self.exhausted {
            return Ok(());
        }
        self.buffer.clear();
        let summary = self.connection.discard(-1).await?;
        self.summary = summary;
        self.exhausted = true;
        self.has_more = false;
        Ok(())
    }

    /// Collect every remaining row. Mirrors the common "materialise
    /// everything" convenience method, built on top of [`RecordStream::next`]
    /// rather than a separate code path so `max_rows`/`fetch_size` are
    /// honoured identically.
    pub async fn collect(mut self) -> Result<Vec<Record>, BoltError> {
        let mut rows = Vec::new();
        while let Some(record) = self.next().await? {
            rows.push(record);
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::handshake::{self, BoltVersion};
    use crate::config::ConnectionConfigBuilder;
    use crate::value::{OrderedMap, Value};

    async fn paired() -> (Connection, tokio::io::DuplexStream) {
        let (client, mut server) = tokio::io::duplex(1 << 16);
        let server_task = tokio::spawn(async move {
            handshake::perform_server_handshake(&mut server, &[BoltVersion::new(5, 4)])
                .await
                .unwrap();
            use crate::bolt::framing::{read_message, write_message};
            let _ = read_message(&mut server).await.unwrap();
            write_message(&mut server, &write_success(OrderedMap::new()))
                .await
                .unwrap();
            server
        });
        let config = ConnectionConfigBuilder::new().fetch_size(2).build();
        let connection = Connection::open(client, config, handshake::default_proposals())
            .await
            .unwrap();
        connection.hello(OrderedMap::new()).await.unwrap();
        (connection, server_task.await.unwrap())
    }

    fn write_record(values: Vec<Value>) -> Vec<u8> {
        use crate::bolt::message::sig;
        use crate::packstream::Writer;
        use crate::signatures::pack_value;
        let mut w = Writer::new();
        w.write_struct_header(sig::RECORD, 1).unwrap();
        pack_value(&mut w, &Value::List(values)).unwrap();
        w.into_bytes().to_vec()
    }

    fn write_success(meta: OrderedMap) -> Vec<u8> {
        use crate::bolt::message::sig;
        use crate::packstream::Writer;
        use crate::signatures::pack_value;
        let mut w = Writer::new();
        w.write_struct_header(sig::SUCCESS, 1).unwrap();
        pack_value(&mut w, &Value::Map(meta)).unwrap();
        w.into_bytes().to_vec()
    }

    #[tokio::test]
    async fn stream_pulls_in_fetch_size_batches_and_stops() {
        let (connection, mut server) = paired().await;

        let serve = tokio::spawn(async move {
            use crate::bolt::framing::{read_message, write_message};
            // RUN
            let _ = read_message(&mut server).await.unwrap();
            let mut fields = OrderedMap::new();
            fields.insert("fields", Value::List(vec![Value::String("x".into())]));
            write_message(&mut server, &write_success(fields)).await.unwrap();
            // first PULL n=2 -> two records, has_more=true
            let _ = read_message(&mut server).await.unwrap();
            write_message(&mut server, &write_record(vec![Value::Integer(1)]))
                .await
                .unwrap();
            write_message(&mut server, &write_record(vec![Value::Integer(2)]))
                .await
                .unwrap();
            let mut has_more = OrderedMap::new();
            has_more.insert("has_more", Value::Boolean(true));
            write_message(&mut server, &write_success(has_more)).await.unwrap();
            // second PULL n=2 -> one record, terminal
            let _ = read_message(&mut server).await.unwrap();
            write_message(&mut server, &write_record(vec![Value::Integer(3)]))
                .await
                .unwrap();
            write_message(&mut server, &write_success(OrderedMap::new()))
                .await
                .unwrap();
        });

        let outcome = connection
            .run("RETURN 1 AS x", OrderedMap::new(), OrderedMap::new())
            .await
            .unwrap();
        let mut stream = RecordStream::new(connection, outcome.keys, 2, None);

        let mut seen = Vec::new();
        while let Some(mut record) = stream.next().await.unwrap() {
            seen.push(record.get_i64(0).unwrap());
        }
        assert_eq!(seen, vec![1, 2, 3]);
        assert!(stream.summary().is_some());
        serve.await.unwrap();
    }

    #[tokio::test]
    async fn max_rows_truncates_the_final_pull() {
        let (connection, mut server) = paired().await;
        let serve = tokio::spawn(async move {
            use crate::bolt::framing::{read_message, write_message};
            let _ = read_message(&mut server).await.unwrap();
            let mut fields = OrderedMap::new();
            fields.insert("fields", Value::List(vec![Value::String("x".into())]));
            write_message(&mut server, &write_success(fields)).await.unwrap();
            let _ = read_message(&mut server).await.unwrap(); // PULL n=1
            write_message(&mut server, &write_record(vec![Value::Integer(9)]))
                .await
                .unwrap();
            let mut has_more = OrderedMap::new();
            has_more.insert("has_more", Value::Boolean(true));
            write_message(&mut server, &write_success(has_more)).await.unwrap();
        });

        let outcome = connection
            .run("RETURN 1 AS x", OrderedMap::new(), OrderedMap::new())
            .await
            .unwrap();
        let mut stream = RecordStream::new(connection, outcome.keys, 2, Some(1));
        let first = stream.next().await.unwrap();
        assert!(first.is_some());
        let second = stream.next().await.unwrap();
        assert!(second.is_none());
        serve.await.unwrap();
    }
}
