//! Exchange routing tests for every exchange kind

#[cfg(test)]
mod tests {
    use super::super::helpers::{channel_with_queues, drain_texts};
    use crate::error::Error;
    use crate::message::Message;
    use crate::transport::{Binding, ExchangeDefinition, ExchangeKind};

    #[test]
    fn test_direct_and_default_exchange() {
        let (_broker, _transport, channel) = channel_with_queues(&["red", "blue"]);
        channel
            .declare_exchange(&ExchangeDefinition::new("colours", ExchangeKind::Direct))
            .unwrap();
        channel.bind_queue("red", &Binding::new("colours", "red")).unwrap();

        channel.publish("colours", "red", &Message::new("via exchange")).unwrap();
        channel.publish("colours", "green", &Message::new("unroutable")).unwrap();
        channel.publish("", "blue", &Message::new("direct to queue")).unwrap();

        assert_eq!(drain_texts(&channel, "red"), vec!["via exchange"]);
        assert_eq!(drain_texts(&channel, "blue"), vec!["direct to queue"]);
    }

    #[test]
    fn test_fanout_reaches_every_bound_queue() {
        let (_broker, _transport, channel) = channel_with_queues(&["a", "b"]);
        channel
            .declare_exchange(&ExchangeDefinition::new("broadcast", ExchangeKind::Fanout))
            .unwrap();
        channel.bind_queue("a", &Binding::new("broadcast", "")).unwrap();
        channel.bind_queue("b", &Binding::new("broadcast", "ignored")).unwrap();

        channel.publish("broadcast", "anything", &Message::new("hi")).unwrap();

        assert_eq!(drain_texts(&channel, "a"), vec!["hi"]);
        assert_eq!(drain_texts(&channel, "b"), vec!["hi"]);
    }

    #[test]
    fn test_topic_patterns() {
        let (_broker, _transport, channel) = channel_with_queues(&["nyse", "stock"]);
        channel
            .declare_exchange(&ExchangeDefinition::new("quotes", ExchangeKind::Topic))
            .unwrap();
        channel.bind_queue("nyse", &Binding::new("quotes", "*.*.nyse")).unwrap();
        channel.bind_queue("stock", &Binding::new("quotes", "stock.#")).unwrap();

        channel.publish("quotes", "stock.usd.nyse", &Message::new("both")).unwrap();
        channel.publish("quotes", "stock.eur", &Message::new("stock only")).unwrap();

        assert_eq!(drain_texts(&channel, "nyse"), vec!["both"]);
        assert_eq!(drain_texts(&channel, "stock"), vec!["both", "stock only"]);
    }

    #[test]
    fn test_headers_exchange() {
        let (_broker, _transport, channel) = channel_with_queues(&["pdf"]);
        channel
            .declare_exchange(&ExchangeDefinition::new("documents", ExchangeKind::Headers))
            .unwrap();
        channel
            .bind_queue(
                "pdf",
                &Binding::new("documents", "")
                    .with_argument("x-match", "all")
                    .with_argument("format", "pdf")
                    .with_argument("type", "report"),
            )
            .unwrap();

        let matching = Message::new("match")
            .with_header("format", "pdf")
            .with_header("type", "report");
        let partial = Message::new("partial").with_header("format", "pdf");
        channel.publish("documents", "", &matching).unwrap();
        channel.publish("documents", "", &partial).unwrap();

        assert_eq!(drain_texts(&channel, "pdf"), vec!["match"]);
    }

    #[test]
    fn test_exchange_to_exchange_delivers_once() {
        let (_broker, _transport, channel) = channel_with_queues(&["audit"]);
        for name in ["ingress", "mirror"] {
            channel
                .declare_exchange(&ExchangeDefinition::new(name, ExchangeKind::Fanout))
                .unwrap();
        }
        channel.bind_exchange("mirror", &Binding::new("ingress", "")).unwrap();
        channel.bind_queue("audit", &Binding::new("ingress", "")).unwrap();
        channel.bind_queue("audit", &Binding::new("mirror", "")).unwrap();

        channel.publish("ingress", "", &Message::new("event")).unwrap();
        assert_eq!(drain_texts(&channel, "audit"), vec!["event"]);

        channel.unbind_queue("audit", &Binding::new("ingress", "")).unwrap();
        channel.unbind_queue("audit", &Binding::new("mirror", "")).unwrap();
        channel.publish("ingress", "", &Message::new("dropped")).unwrap();
        assert!(drain_texts(&channel, "audit").is_empty());
    }

    #[test]
    fn test_topology_errors() {
        let (_broker, _transport, channel) = channel_with_queues(&["q"]);
        channel
            .declare_exchange(&ExchangeDefinition::new("events", ExchangeKind::Topic))
            .unwrap();

        assert!(matches!(
            channel.declare_exchange(&ExchangeDefinition::new("events", ExchangeKind::Fanout)),
            Err(Error::Channel { .. })
        ));
        assert!(matches!(
            channel.publish("missing", "key", &Message::new("x")),
            Err(Error::Channel { .. })
        ));
        assert!(matches!(
            channel.bind_queue("q", &Binding::new("", "q")),
            Err(Error::Channel { .. })
        ));
    }
}
