//! Small hand-built XGBoost JSON artifacts for tests.

/// One split on LNR < 0.3: left leaf -1.0 (cover 60), right leaf 1.5 (cover 40).
const STUMP_TREE: &str = r#"{"base_weights":[0.0,-1.0,1.5],"categories":[],"default_left":[1,0,0],"id":0,"left_children":[1,-1,-1],"loss_changes":[1.0,0.0,0.0],"parents":[2147483647,0,0],"right_children":[2,-1,-1],"split_conditions":[0.3,-1.0,1.5],"split_indices":[3,0,0],"split_type":[0,0,0],"sum_hessian":[100.0,60.0,40.0],"tree_param":{"num_deleted":"0","num_feature":"4","num_nodes":"3","size_leaf_vector":"1"}}"#;

/// T_Code < 2.5 ? (Age < 60 ? -0.4 : 0.1) : (LNR < 0.2 ? 0.2 : 0.9)
const TREE_T_AGE_LNR: &str = r#"{"default_left":[1,0,0,0,0,0,0],"id":0,"left_children":[1,3,5,-1,-1,-1,-1],"right_children":[2,4,6,-1,-1,-1,-1],"split_conditions":[2.5,60.0,0.2,-0.4,0.1,0.2,0.9],"split_indices":[2,0,3,0,0,0,0],"sum_hessian":[100.0,50.0,50.0,30.0,20.0,25.0,25.0]}"#;

/// Age < 70 ? (T_Code < 3.5 ? -0.1 : 0.2) : 0.3
const TREE_AGE_T: &str = r#"{"default_left":[0,0,0,0,0],"id":1,"left_children":[1,3,-1,-1,-1],"right_children":[2,4,-1,-1,-1],"split_conditions":[70.0,3.5,0.3,-0.1,0.2],"split_indices":[0,2,0,0,0],"sum_hessian":[100.0,70.0,30.0,50.0,20.0]}"#;

/// LNR < 0.5 ? (LNR < 0.1 ? -0.3 : 0.05) : 0.6; the same feature twice on one path.
const TREE_LNR_LNR: &str = r#"{"default_left":[0,0,0,0,0],"id":2,"left_children":[1,3,-1,-1,-1],"right_children":[2,4,-1,-1,-1],"split_conditions":[0.5,0.1,0.6,-0.3,0.05],"split_indices":[3,3,0,0,0],"sum_hessian":[100.0,80.0,20.0,40.0,40.0]}"#;

fn gbtree(trees: &[&str]) -> String {
    let info = vec!["0"; trees.len()].join(",");
    format!(
        r#"{{"model":{{"gbtree_model_param":{{"num_parallel_tree":"1","num_trees":"{}"}},"tree_info":[{}],"trees":[{}]}},"name":"gbtree"}}"#,
        trees.len(),
        info,
        trees.join(",")
    )
}

fn document(booster: &str) -> String {
    format!(
        r#"{{"learner":{{"attributes":{{}},"feature_names":["Age_Numeric","Sex_Code","T_Code","LNR"],"feature_types":["int","int","int","float"],"gradient_booster":{booster},"learner_model_param":{{"base_score":"5E-1","boost_from_average":"1","num_class":"0","num_feature":"4","num_target":"1"}},"objective":{{"name":"binary:logistic","reg_loss_param":{{"scale_pos_weight":"1"}}}}}},"version":[2,0,3]}}"#
    )
}

pub fn stump_json() -> String {
    document(&gbtree(&[STUMP_TREE]))
}

pub fn ensemble_json() -> String {
    document(&gbtree(&[TREE_T_AGE_LNR, TREE_AGE_T, TREE_LNR_LNR]))
}

pub fn dart_json(weight: f64) -> String {
    document(&format!(
        r#"{{"gbtree":{},"name":"dart","weight_drop":[{weight}]}}"#,
        gbtree(&[STUMP_TREE])
    ))
}
