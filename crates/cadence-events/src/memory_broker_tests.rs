    use super::*;

    async fn filled(key: &str, values: &[&str]) -> MemoryBroker {
        let broker = MemoryBroker::new();
        for value in values {
            broker.push(key, value.to_string()).await.unwrap();
        }
        broker
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(resolve_range(0, -1, 5), Some((0, 4)));
        assert_eq!(resolve_range(0, 99, 5), Some((0, 4)));
        assert_eq!(resolve_range(-2, -1, 5), Some((3, 4)));
        assert_eq!(resolve_range(3, 1, 5), None);
        assert_eq!(resolve_range(7, 9, 5), None);
        assert_eq!(resolve_range(0, -1, 0), None);
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(0, 3), Some(0));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(3, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let broker = MemoryBroker::new();
        assert_eq!(broker.publish("orders:order.created", "{}").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let broker = MemoryBroker::new();
        let mut rx = broker.subscribe("orders:order.created");

        let delivered = broker.publish("orders:order.created", "hello").await.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(rx.recv().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_channels_are_isolated() {
        let broker = MemoryBroker::new();
        let mut rx = broker.subscribe("orders:order.created");

        broker.publish("orders:order.cancelled", "nope").await.unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_push_is_head_first() {
        let broker = filled("k", &["a", "b", "c"]).await;

        assert_eq!(broker.len("k").await.unwrap(), 3);
        assert_eq!(broker.range("k", 0, -1).await.unwrap(), vec!["c", "b", "a"]);
        assert_eq!(broker.index("k", 0).await.unwrap().as_deref(), Some("c"));
        assert_eq!(broker.index("k", -1).await.unwrap().as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_trim_keeps_newest() {
        let broker = filled("k", &["1", "2", "3", "4", "5"]).await;

        broker.trim("k", 0, 2).await.unwrap();
        assert_eq!(broker.range("k", 0, -1).await.unwrap(), vec!["5", "4", "3"]);
    }

    #[tokio::test]
    async fn test_trim_to_empty_removes_key() {
        let broker = filled("k", &["1"]).await;

        broker.trim("k", 5, 10).await.unwrap();
        assert_eq!(broker.len("k").await.unwrap(), 0);
        assert!(!broker.delete("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_key_reads() {
        let broker = MemoryBroker::new();
        assert_eq!(broker.len("nope").await.unwrap(), 0);
        assert!(broker.range("nope", 0, 10).await.unwrap().is_empty());
        assert!(broker.index("nope", 0).await.unwrap().is_none());
        assert!(!broker.expire("nope", Duration::from_secs(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let broker = filled("k", &["a"]).await;
        assert!(broker.delete("k").await.unwrap());
        assert_eq!(broker.len("k").await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_drops_list() {
        let broker = filled("k", &["a", "b"]).await;
        assert!(broker.expire("k", Duration::from_secs(60)).await.unwrap());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(broker.len("k").await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(broker.len("k").await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_is_refreshed() {
        let broker = filled("k", &["a"]).await;
        broker.expire("k", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        broker.push("k", "b".to_string()).await.unwrap();
        broker.expire("k", Duration::from_secs(60)).await.unwrap();

        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(broker.len("k").await.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_push_after_expiry_starts_fresh() {
        let broker = filled("k", &["old"]).await;
        broker.expire("k", Duration::from_secs(1)).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(broker.push("k", "new".to_string()).await.unwrap(), 1);
        assert_eq!(broker.range("k", 0, -1).await.unwrap(), vec!["new"]);
    }
