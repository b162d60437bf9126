mod graph_basic;
mod node_ops;
mod path;
