use std::sync::Arc;
use std::time::{Duration, Instant};

use devtree_common::config::{Config, NodeStyles};
use devtree_common::tree::HostTree;
use serde_json::{Value, json};

use crate::support::{ScriptedConnector, ScriptedHost, builder, quick_config};

fn lab_host() -> ScriptedHost {
    ScriptedHost::new()
        .names("domains lab*", &["lab1", "lab2"])
        .names("families lab1/**", &["ctrl"])
        .names("members lab1/ctrl/**", &["motor1"])
}

fn domain_names(tree: &HostTree) -> Vec<&str> {
    tree.domains().map(|domain| domain.value.as_str()).collect()
}

/// One valid host among an unparsable one, filtered to the `lab` domains.
#[tokio::test]
async fn builds_only_the_valid_host() {
    let connector = ScriptedConnector::new().host("svc1:10000", lab_host());
    let (builder, log) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000", "not a host"], &["lab/*/*"])
        .await
        .unwrap();

    assert_eq!(trees.len(), 1, "only svc1 should produce a tree");
    let tree = &trees[0];
    assert_eq!(tree.id, "svc1:10000");
    assert_eq!(domain_names(tree), vec!["lab1", "lab2"]);
    assert!(tree.aliases().unwrap().data.is_empty());

    let lab1 = tree.domains().next().unwrap();
    assert_eq!(lab1.data.len(), 1);
    assert_eq!(lab1.data[0].value, "ctrl");
    let motor = &lab1.data[0].data[0];
    assert_eq!(motor.value, "motor1");
    assert_eq!(motor.device_name, "lab1/ctrl/motor1");
    assert_eq!(motor.device_id, "svc1:10000/lab1/ctrl/motor1");

    let lab2 = tree.domains().nth(1).unwrap();
    assert!(lab2.data.is_empty(), "lab2 has no families");

    assert_eq!(log.connects(), 1);
}

#[tokio::test]
async fn bare_host_names_prefix_device_ids() {
    let connector = ScriptedConnector::new().host("svc1", lab_host());
    let (builder, _) = builder(connector, quick_config());

    let trees = builder.build_for_hosts(&["svc1"], &["lab/*/*"]).await.unwrap();

    let ids: Vec<&str> = trees[0].members().map(|m| m.device_id.as_str()).collect();
    assert_eq!(ids, vec!["svc1/lab1/ctrl/motor1"]);
}

#[tokio::test]
async fn no_filter_queries_everything() {
    let host = ScriptedHost::new()
        .names("domains **", &["sys"])
        .names("families sys/**", &["tg_test"])
        .names("members sys/tg_test/**", &["1", "2"]);
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, log) = builder(connector, quick_config());

    let none = builder
        .build_for_hosts(&["svc1:10000"], &Vec::<String>::new())
        .await
        .unwrap();
    let explicit = builder
        .build_for_hosts(&["svc1:10000"], &["*/*/*"])
        .await
        .unwrap();

    assert_eq!(
        serde_json::to_value(&none).unwrap(),
        serde_json::to_value(&explicit).unwrap()
    );
    assert_eq!(none[0].members().count(), 2);

    let calls = log.calls();
    assert!(calls.contains(&"svc1:10000 domains **".to_string()));
    assert!(calls.contains(&"svc1:10000 members sys/tg_test/**".to_string()));
}

#[tokio::test]
async fn failed_pattern_leaves_the_others() {
    let host = ScriptedHost::new()
        .fail("domains lab*")
        .names("domains sys*", &["sys"])
        .names("families sys/**", &["tg_test"]);
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &["lab/*/*", "sys/*/*"])
        .await
        .unwrap();

    assert_eq!(domain_names(&trees[0]), vec!["sys"]);
}

#[tokio::test]
async fn failed_branch_spares_its_siblings() {
    let host = ScriptedHost::new()
        .names("domains **", &["lab1", "lab2"])
        .fail("families lab1/**")
        .names("families lab2/**", &["vac", "ctrl"])
        .fail("members lab2/vac/**")
        .names("members lab2/ctrl/**", &["motor9"]);
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder.build_for_hosts(&["svc1:10000"], &[""]).await.unwrap();
    let tree = &trees[0];

    assert_eq!(domain_names(tree), vec!["lab1", "lab2"]);
    let mut domains = tree.domains();
    assert!(domains.next().unwrap().data.is_empty());

    let lab2 = domains.next().unwrap();
    let families: Vec<&str> = lab2.data.iter().map(|f| f.value.as_str()).collect();
    assert_eq!(families, vec!["vac", "ctrl"]);
    assert!(lab2.data[0].data.is_empty());
    assert_eq!(lab2.data[1].data[0].device_id, "svc1:10000/lab2/ctrl/motor9");
}

#[tokio::test]
async fn overlapping_patterns_keep_duplicates() {
    let host = ScriptedHost::new()
        .names("domains lab*", &["lab1"])
        .names("domains l*", &["lab1"]);
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &["lab/*/*", "l/*/*"])
        .await
        .unwrap();

    assert_eq!(domain_names(&trees[0]), vec!["lab1", "lab1"]);
}

#[tokio::test]
async fn bad_and_unreachable_hosts_drop_out_in_order() {
    let connector = ScriptedConnector::new()
        .host("svc1:10000", lab_host())
        .host("svc2:10000", lab_host());
    let (builder, log) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(
            &["svc2:10000", "not a host", "ghost:10000", "svc1:10000", "x:notaport"],
            &["lab/*/*"],
        )
        .await
        .unwrap();

    let ids: Vec<&str> = trees.iter().map(|tree| tree.id.as_str()).collect();
    assert_eq!(ids, vec!["svc2:10000", "svc1:10000"]);
    assert_eq!(log.connects(), 3, "unparsable hosts are never dialed");
}

#[tokio::test]
async fn malformed_filter_rejects_before_any_call() {
    let connector = ScriptedConnector::new().host("svc1:10000", lab_host());
    let (builder, log) = builder(connector, quick_config());

    let result = builder
        .build_for_hosts(&["svc1:10000"], &["lab/*/*", "lab/ctrl"])
        .await;

    assert!(result.is_err());
    assert_eq!(log.connects(), 0);
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn member_ids_are_host_and_path() {
    let host = ScriptedHost::new()
        .names("domains **", &["a", "b"])
        .names("families a/**", &["f1", "f2"])
        .names("families b/**", &["f1"])
        .names("members a/f1/**", &["m1", "m2"])
        .names("members a/f2/**", &["m3"])
        .names("members b/f1/**", &["m1"]);
    let connector = ScriptedConnector::new()
        .host("svc1:10000", host.clone())
        .host("db.lab:20000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000", "db.lab:20000"], &Vec::<String>::new())
        .await
        .unwrap();

    let mut seen = 0;
    for tree in &trees {
        for domain in tree.domains() {
            for family in &domain.data {
                for member in &family.data {
                    let expected = format!(
                        "{}/{}/{}/{}",
                        tree.id, domain.value, family.value, member.value
                    );
                    assert_eq!(member.device_id, expected);
                    seen += 1;
                }
            }
        }
    }
    assert_eq!(seen, 8);
}

#[tokio::test]
async fn unresolvable_aliases_are_dropped() {
    let host = ScriptedHost::new()
        .names("aliases *", &["motor", "ghost", "broken"])
        .alias("motor", "lab1/ctrl/motor1")
        .alias("broken", "lab1/ctrl");
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &Vec::<String>::new())
        .await
        .unwrap();

    let aliases = &trees[0].aliases().unwrap().data;
    assert_eq!(aliases.len(), 1);
    assert_eq!(aliases[0].value, "motor");
    assert!(aliases[0].is_alias);
    assert_eq!(aliases[0].device_name, "lab1/ctrl/motor1");
    assert_eq!(aliases[0].device_id, "svc1:10000/lab1/ctrl/motor1");
}

#[tokio::test]
async fn alias_listing_failure_keeps_the_host() {
    let host = lab_host().fail("aliases *");
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &["lab/*/*"])
        .await
        .unwrap();

    assert_eq!(trees.len(), 1);
    assert!(trees[0].aliases().unwrap().data.is_empty());
    assert_eq!(trees[0].members().count(), 1);
}

#[tokio::test]
async fn narrowing_filter_screens_aliases() {
    let host = lab_host()
        .names("aliases *", &["motor", "test", "pump"])
        .alias("motor", "lab1/ctrl/motor1")
        .alias("test", "sys/tg_test/1")
        .alias("pump", "lab2/vac/pump1");
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let (builder, _) = builder(connector, quick_config());

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &["lab/ctrl/*"])
        .await
        .unwrap();

    let names: Vec<&str> = trees[0]
        .aliases()
        .unwrap()
        .data
        .iter()
        .map(|alias| alias.value.as_str())
        .collect();
    assert_eq!(names, vec!["motor"]);
}

#[tokio::test]
async fn slow_calls_only_cost_their_branch() {
    let host = ScriptedHost::new()
        .stall("domains **", Duration::from_secs(10))
        .names("aliases *", &["motor"])
        .alias("motor", "lab1/ctrl/motor1");
    let connector = ScriptedConnector::new()
        .host("svc1:10000", host)
        .host("slow:10000", lab_host().connect_delay(Duration::from_secs(10)));
    let (builder, _) = builder(connector, quick_config());

    let started = Instant::now();
    let trees = builder
        .build_for_hosts(&["slow:10000", "svc1:10000"], &Vec::<String>::new())
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(trees.len(), 1, "the host that never connects is dropped");
    assert_eq!(trees[0].id, "svc1:10000");
    assert_eq!(trees[0].domains().count(), 0);
    assert_eq!(trees[0].aliases().unwrap().data.len(), 1);
}

#[tokio::test]
async fn results_follow_request_order_not_completion_order() {
    let connector = ScriptedConnector::new()
        .host("first:10000", lab_host().connect_delay(Duration::from_millis(200)))
        .host("second:10000", lab_host())
        .host("third:10000", lab_host().connect_delay(Duration::from_millis(50)));
    let config = Config {
        call_timeout: Duration::from_secs(2),
        ..Config::default()
    };
    let (builder, _) = builder(connector, config);

    let trees = builder
        .build_for_hosts(&["first:10000", "second:10000", "third:10000"], &["lab/*/*"])
        .await
        .unwrap();

    let ids: Vec<&str> = trees.iter().map(|tree| tree.id.as_str()).collect();
    assert_eq!(ids, vec!["first:10000", "second:10000", "third:10000"]);
}

#[tokio::test]
async fn documents_have_the_widget_shape() {
    let host = lab_host()
        .names("domains lab1*", &["lab1"])
        .names("aliases *", &["motor"])
        .alias("motor", "lab1/ctrl/motor1");
    let connector = ScriptedConnector::new().host("svc1:10000", host);
    let config = Config {
        styles: NodeStyles {
            host: Some("tango-host".to_string()),
            member: Some("tango-device".to_string()),
            ..NodeStyles::default()
        },
        ..quick_config()
    };
    let (builder, _) = builder(connector, config);

    let trees = builder
        .build_for_hosts(&["svc1:10000"], &["lab1/*/*"])
        .await
        .unwrap();
    let document: Value = serde_json::to_value(&trees).unwrap();

    let expected = json!([{
        "id": "svc1:10000",
        "value": "svc1:10000",
        "$css": "tango-host",
        "data": [
            {
                "value": "aliases",
                "data": [{
                    "value": "motor",
                    "isAlias": true,
                    "device_name": "lab1/ctrl/motor1",
                    "device_id": "svc1:10000/lab1/ctrl/motor1"
                }]
            },
            {
                "value": "lab1",
                "data": [{
                    "value": "ctrl",
                    "data": [{
                        "value": "motor1",
                        "isMember": true,
                        "device_name": "lab1/ctrl/motor1",
                        "device_id": "svc1:10000/lab1/ctrl/motor1",
                        "$css": "tango-device"
                    }]
                }]
            }
        ]
    }]);
    assert_eq!(document, expected);
}

fn assert_send<T: Send>(_: &T) {}

#[test]
fn builds_over_owned_strings_are_send() {
    let (builder, _) = builder(ScriptedConnector::new(), quick_config());
    let hosts: Vec<String> = vec!["svc1:10000".to_string()];
    let filters: Vec<String> = vec!["lab/*/*".to_string()];

    let build = builder.build_for_hosts(&hosts, &filters);
    assert_send(&build);
}

#[tokio::test(flavor = "multi_thread")]
async fn builds_run_on_spawned_tasks() {
    let connector = ScriptedConnector::new().host("svc1:10000", lab_host());
    let (builder, _) = builder(connector, quick_config());
    let builder = Arc::new(builder);

    let hosts = vec!["svc1:10000".to_string()];
    let filters = vec!["lab/*/*".to_string()];
    let task = tokio::spawn(async move { builder.build_for_hosts(&hosts, &filters).await });

    let trees = task.await.unwrap().unwrap();
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].members().count(), 1);
}
