// Copyright 2024 The MQMaster Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Checks that the entity model and the topic line codec agree with each
//! other the way the manager uses them.

use mqmaster_common::common::constant::max_msg_size_in_bytes;
use mqmaster_common::common::entity::BaseEntity;
use mqmaster_common::common::entity::BrokerConfig;
use mqmaster_common::common::entity::ClusterDefaults;
use mqmaster_common::common::entity::TopicControl;
use mqmaster_common::common::entity::TopicDeployment;
use mqmaster_common::common::manage_status::ManageStatus;
use mqmaster_common::common::topic_conf_line::TopicConfLine;
use mqmaster_common::common::topic_prop_group::TopicPropUpdate;

#[test]
fn test_deployment_line_against_broker_defaults() {
    let mut broker =
        BrokerConfig::new(BaseEntity::new("admin"), 9, "10.0.0.9").with_manage_status(ManageStatus::Online);
    broker.topic_props.num_partitions = 10;
    let cluster = ClusterDefaults::default();

    let mut deploy = TopicDeployment::from_broker(BaseEntity::new("admin"), &broker, "billing");
    TopicPropUpdate::default()
        .with_num_topic_stores(2)
        .apply_to(&mut deploy.topic_props);
    let ctrl = TopicControl::new(BaseEntity::new("admin"), "billing").with_max_msg_size_in_mb(2);

    let max_size = ctrl.max_msg_size_in_b().unwrap_or(cluster.max_msg_size_in_b());
    let line = deploy.to_conf_line(max_size).encode(&broker.topic_props, cluster.max_msg_size_in_b());
    assert_eq!(line, "billing: : : : : : : :2:0: : : : :2098176");

    let decoded = TopicConfLine::decode(&line, &broker.topic_props, cluster.max_msg_size_in_b()).unwrap();
    assert_eq!(decoded.props, deploy.topic_props);
    assert_eq!(decoded.props.num_partitions, 10);
    assert_eq!(decoded.max_msg_size_in_b, max_msg_size_in_bytes(2));
}
