use crate::nn::{Graph, OpKind, OpRecord, Topology};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// 随机分层DAG上的调度健全性检查：
/// 每个被处理的节点恰好出现一次，且处理时刻的贡献数等于依赖计数；
/// Add链路的导数恒为1，输入梯度应等于输入到输出的路径条数。
#[test]
fn test_random_dag_scheduling_soundness() {
    for seed in [7u64, 42, 2026] {
        let mut rng = StdRng::seed_from_u64(seed);
        let layers = rng.gen_range(3..6);
        let width = rng.gen_range(2..5);

        // wiring[节点名] = 两个来源名
        let mut wiring: HashMap<String, [String; 2]> = HashMap::new();
        let mut topology = Topology::new("x", "out");
        let mut prev_layer: Vec<String> = vec!["x".to_string()];
        for l in 0..layers {
            let mut this_layer = Vec::new();
            for k in 0..width {
                let name = format!("n_{l}_{k}");
                let a = prev_layer[rng.gen_range(0..prev_layer.len())].clone();
                let b = prev_layer[rng.gen_range(0..prev_layer.len())].clone();
                topology = topology.record(OpRecord::new(OpKind::Add, &[&a, &b], &name));
                wiring.insert(name.clone(), [a, b]);
                this_layer.push(name);
            }
            prev_layer = this_layer;
        }
        let a = prev_layer[0].clone();
        let b = prev_layer[rng.gen_range(0..prev_layer.len())].clone();
        topology = topology.record(OpRecord::new(OpKind::Add, &[&a, &b], "out"));
        wiring.insert("out".to_string(), [a, b]);

        let mut graph = Graph::build(&topology, &[]).unwrap();
        graph.forward(&Tensor::ones(&[1, 2])).unwrap();
        let dx = graph.backward(&Tensor::ones(&[1, 2])).unwrap();

        // 路径计数：从输出往回按登记逆序做动态规划
        let mut path_counts: HashMap<String, f32> = HashMap::new();
        path_counts.insert("out".to_string(), 1.0);
        for record in topology.records.iter().rev() {
            let name = if record.output.is_empty() {
                unreachable!()
            } else {
                &record.output
            };
            let count = path_counts.get(name).copied().unwrap_or(0.0);
            if count == 0.0 {
                continue;
            }
            for source in &wiring[name] {
                *path_counts.entry(source.clone()).or_insert(0.0) += count;
            }
        }
        let expected = path_counts.get("x").copied().unwrap_or(0.0);
        assert!(expected >= 1.0);
        assert_eq!(dx, &Tensor::ones(&[1, 2]) * expected);

        let report = graph.last_backward_report().unwrap();
        assert!(report.end_reached);

        // 恰好一次
        let mut seen = Vec::new();
        for p in &report.processed {
            assert!(!seen.contains(&p.id), "节点{}被处理了两次", p.name);
            seen.push(p.id);
            // 集齐全部贡献后才被处理
            assert_eq!(
                p.contributions, p.dependency_count,
                "节点{}在贡献数{}≠依赖计数{}时被处理",
                p.name, p.contributions, p.dependency_count
            );
        }
        // 未被处理的节点必然一份贡献都没收到（孤儿支路）
        for (_, contributions, _) in &report.unprocessed {
            assert_eq!(*contributions, 0);
        }
    }
}
