//! A Bolt/PackStream driver for a property-graph database, plus a
//! SQL→Cypher translator for relational-style client code that wants to
//! talk to it. See [`bolt`] for the wire protocol and connection lifecycle,
//! [`value`] for the typed value model records are made of, [`stream`] for
//! consuming a running query's results, and [`translate`] for the
//! statement-level SQL→Cypher rewrite.

pub mod bolt;
pub mod config;
pub mod error;
pub mod logging;
pub mod packstream;
pub mod record;
pub mod signatures;
pub mod stream;
pub mod summary;
pub mod translate;
pub mod value;

pub use bolt::{BoltVersion, Connection, ConnectionState};
pub use config::{ConnectionConfig, ConnectionConfigBuilder};
pub use error::{BoltError, CoercionError, DriverError, PackStreamError, Result, TranslateError};
pub use record::Record;
pub use stream::RecordStream;
pub use summary::{Counters, Notification, Summary};
pub use translate::{translate, NameCase, TranslatorConfig, TranslatorConfigBuilder};
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bolt::handshake;
    use crate::value::OrderedMap;

    /// An end-to-end smoke test: handshake, HELLO, an auto-commit RUN, one
    /// PULL batch, COMMIT-free shutdown via GOODBYE, all over an in-memory
    /// duplex transport standing in for a real TCP connection.
    #[tokio::test]
    async fn drives_a_whole_autocommit_query_over_an_in_memory_transport() {
        use crate::bolt::framing::{read_message, write_message};
        use crate::bolt::message::sig;
        use crate::packstream::Writer;
        use crate::signatures::pack_value;

        let (client, mut server) = tokio::io::duplex(1 << 16);
        let server_task = tokio::spawn(async move {
            handshake::perform_server_handshake(&mut server, &[handshake::BoltVersion::new(5, 4)])
                .await
                .unwrap();

            let write_success = |meta: OrderedMap| {
                let mut w = Writer::new();
                w.write_struct_header(sig::SUCCESS, 1).unwrap();
                pack_value(&mut w, &Value::Map(meta)).unwrap();
                w.into_bytes().to_vec()
            };

            // HELLO
            let _ = read_message(&mut server).await.unwrap();
            write_message(&mut server, &write_success(OrderedMap::new()))
                .await
                .unwrap();

            // RUN
            let _ = read_message(&mut server).await.unwrap();
            let mut fields = OrderedMap::new();
            fields.insert("fields", Value::List(vec![Value::String("greeting".into())]));
            write_message(&mut server, &write_success(fields)).await.unwrap();

            // PULL
            let _ = read_message(&mut server).await.unwrap();
            let mut w = Writer::new();
            w.write_struct_header(sig::RECORD, 1).unwrap();
            pack_value(
                &mut w,
                &Value::List(vec![Value::String("hello, bolt".into())]),
            )
            .unwrap();
            write_message(&mut server, &w.into_bytes()).await.unwrap();
            write_message(&mut server, &write_success(OrderedMap::new()))
                .await
                .unwrap();

            // GOODBYE is a one-way message, but still has to be drained off
            // the wire or the client's final write sees a broken pipe.
            let _ = read_message(&mut server).await;
        });

        let config = ConnectionConfigBuilder::new().build();
        let connection = Connection::open(client, config, handshake::default_proposals())
            .await
            .unwrap();
        connection.hello(OrderedMap::new()).await.unwrap();
        let outcome = connection
            .run("RETURN 'hello, bolt' AS greeting", OrderedMap::new(), OrderedMap::new())
            .await
            .unwrap();
        assert_eq!(outcome.keys.as_slice(), &["greeting".to_string()]);

        let mut stream = RecordStream::new(connection.clone(), outcome.keys, 100, None);
        let mut record = stream.next().await.unwrap().expect("one record");
        assert_eq!(record.get_string(0).unwrap().as_deref(), Some("hello, bolt"));
        assert!(stream.next().await.unwrap().is_none());

        connection.goodbye().await.unwrap();
        server_task.await.unwrap();
    }
}
