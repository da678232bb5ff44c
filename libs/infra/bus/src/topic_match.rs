// [libs/infra/bus/src/topic_match.rs]
//! MQTT-style topic filter matching: `+` matches exactly one segment,
//! a trailing `#` matches the remainder of the topic (any number of
//! segments, including zero). No other wildcard position is special.

pub fn topic_matches(filter: &str, topic: &str) -> bool {
    let filter_segments: Vec<&str> = filter.split('/').collect();
    let topic_segments: Vec<&str> = topic.split('/').collect();

    let mut fi = 0;
    let mut ti = 0;

    while fi < filter_segments.len() {
        match filter_segments[fi] {
            "#" => return true,
            "+" => {
                if ti >= topic_segments.len() {
                    return false;
                }
                fi += 1;
                ti += 1;
            }
            literal => {
                if ti >= topic_segments.len() || topic_segments[ti] != literal {
                    return false;
                }
                fi += 1;
                ti += 1;
            }
        }
    }

    ti == topic_segments.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        assert!(topic_matches("room-temp/kitchen", "room-temp/kitchen"));
        assert!(!topic_matches("room-temp/kitchen", "room-temp/bedroom"));
    }

    #[test]
    fn single_level_wildcard() {
        assert!(topic_matches("room-temp/+", "room-temp/kitchen"));
        assert!(!topic_matches("room-temp/+", "room-temp/kitchen/extra"));
    }

    #[test]
    fn multi_level_wildcard_matches_remainder() {
        assert!(topic_matches("room-temp/#", "room-temp/kitchen"));
        assert!(topic_matches("tapo/#", "tapo/plug-1/energy"));
        assert!(topic_matches("#", "anything/at/all"));
    }

    #[test]
    fn mismatched_segment_count_without_wildcard_fails() {
        assert!(!topic_matches("room-temp/kitchen", "room-temp/kitchen/extra"));
        assert!(!topic_matches("room-temp/kitchen/extra", "room-temp/kitchen"));
    }
}
