//! Scraping simulator.
//!
//! Real Weibo scraping is out of scope; this module replays a staged log
//! sequence and returns a canned post corpus for the requested user id, so
//! the rest of the pipeline can run end to end without network access.

use std::time::Duration;

use crate::error::Result;
use crate::events::EventBus;

const MOCK_CONTENT_LUO: &str = "
[2023-10-27] 罗永浩: 今天发布的这款新手机，工业设计简直是灾难。我一直强调，美学是第一生产力。
[2023-10-28] 罗永浩: 创业的本质就是九死一生。我们在做 AR 眼镜的时候，每天都在解决不可能的问题。
[2023-10-29] 罗永浩: 直播带货不是终点，它只是为了还债。我的梦想依然是科技行业，是下一代计算平台。
[2023-10-30] 罗永浩: 刚刚看完苹果的发布会，感觉稍微有点失望，缺乏那种让人起鸡皮疙瘩的创新了。
[2023-10-31] 罗永浩: 有人问我为什么不退休？生命不息，折腾不止。
[2023-11-01] 罗永浩: 推荐大家看这本书《只有偏执狂才能生存》，特别是做产品的经理们。
";

const MOCK_CONTENT_HE: &str = "
[2023-10-27] 何广智: 最近坐地铁又被认出来了，那人问我“你是何广智吗？”我说“我是”。他说“那你怎么还坐地铁？”我说“因为穷啊！”
[2023-10-28] 何广智: “带刺的玫瑰”，这梗我也就还能玩两年。现在的脱口秀越来越难讲了，观众笑点都高了。
[2023-10-29] 何广智: 只有在舞台上的时候，我才觉得自己是个帅哥。下了台，看着镜子，害，还是那个来自山东的打工小伙。
[2023-10-30] 何广智: 剪头发被Tony老师忽悠办了张卡，出来才反应过来，我这发型需要办卡吗？我是不是被PUA了？
[2023-10-31] 何广智: 生活就是一场大型的脱口秀，只是有时候没人笑，只有自己想哭。这时候就得去便利店买根烤肠安慰自己。
[2023-11-01] 何广智: 真的很想谈恋爱，但是每次遇到喜欢的女生，我第一反应就是“她是不是眼神不好？”自卑刻在骨子里了。
";

const HE_GUANGZHI_ID: &str = "5907116391";

/// Display name of the guest persona behind a user id.
pub fn guest_name_for(user_id: &str) -> &'static str {
    if user_id.trim() == HE_GUANGZHI_ID {
        "何广智 (He Guangzhi)"
    } else {
        "罗永浩 (Luo Yonghao)"
    }
}

/// Simulates scraping a user's posts, emitting staged progress events.
///
/// Returns the aggregated post text. The per-step delay paces the log
/// stream for UI display; tests pass zero.
pub async fn simulate_scrape(
    user_id: &str,
    step_delay: Duration,
    events: &EventBus,
) -> Result<String> {
    let clean_id = user_id.trim();
    let content = if clean_id == HE_GUANGZHI_ID {
        MOCK_CONTENT_HE
    } else {
        MOCK_CONTENT_LUO
    };
    let user_name = guest_name_for(clean_id);

    let pause = || tokio::time::sleep(step_delay);

    events.info(format!(
        "Connecting to Weibo Mobile API for UserID: {}...",
        clean_id
    ));
    pause().await;
    events.success(format!(
        "Successfully resolved container ID for {}.",
        user_name
    ));

    for page in 1..=8 {
        pause().await;
        // Deterministic per-page post count; the original used a random one.
        let found = page % 5 + 1;
        events.info(format!(
            "Parsing page {}... Found {} posts for {}.",
            page, found, user_name
        ));
    }

    pause().await;
    events.warning("Filtering non-text content and reposts...");
    pause().await;
    events.success(format!(
        "Aggregating text data... Total characters: {}",
        content.chars().count()
    ));
    pause().await;
    events.success(format!("Scraping Completed for {}.", user_name));

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventSink, LogEntry, LogLevel, MemorySink};
    use std::sync::Arc;

    struct SharedSink(Arc<MemorySink>);

    impl EventSink for SharedSink {
        fn on_log(&self, entry: &LogEntry) {
            self.0.on_log(entry);
        }
    }

    #[tokio::test]
    async fn returns_default_corpus_with_staged_logs() {
        let bus = EventBus::new();
        let sink = Arc::new(MemorySink::new());
        bus.add_sink(Box::new(SharedSink(sink.clone())));

        let content = simulate_scrape("1234567890", Duration::ZERO, &bus)
            .await
            .unwrap();
        assert!(content.contains("罗永浩"));

        let entries = sink.entries();
        assert!(entries.len() > 10);
        assert!(entries
            .last()
            .unwrap()
            .message
            .contains("Scraping Completed"));
        assert!(sink
            .messages_at(LogLevel::Warning)
            .iter()
            .any(|m| m.contains("Filtering")));
    }

    #[tokio::test]
    async fn special_id_selects_alternate_corpus() {
        let content = simulate_scrape("5907116391", Duration::ZERO, &EventBus::new())
            .await
            .unwrap();
        assert!(content.contains("何广智"));
        assert_eq!(guest_name_for("5907116391"), "何广智 (He Guangzhi)");
        assert_eq!(guest_name_for("0"), "罗永浩 (Luo Yonghao)");
    }
}
