use slotmap::SlotMap;

use crate::scene::NodeKey;
use crate::scene::components::{Attachment, LightType};
use crate::scene::node::HostNode;
use crate::scene::render_settings::RenderSettings;

/// 宿主场景
///
/// 导出管线的只读输入：节点层级、附加组件以及全局渲染设置。
/// 节点遍历顺序由 [`HostScene::traverse`] 决定（根节点顺序 + 深度优先前序）。
#[derive(Debug, Default)]
pub struct HostScene {
    pub name: String,
    pub nodes: SlotMap<NodeKey, HostNode>,
    pub root_nodes: Vec<NodeKey>,
    pub render: RenderSettings,
}

impl HostScene {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// 添加一个节点到场景 (默认放在根节点)
    pub fn add_node(&mut self, node: HostNode) -> NodeKey {
        let key = self.nodes.insert(node);
        self.root_nodes.push(key);
        key
    }

    pub fn add_to_parent(&mut self, child: HostNode, parent: NodeKey) -> NodeKey {
        let key = self.nodes.insert(child);
        self.link(key, parent);
        key
    }

    /// 建立父子关系 (Attach)，child 若原本是根节点则从根列表移除
    pub fn attach(&mut self, child: NodeKey, parent: NodeKey) {
        if child == parent || !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return;
        }

        // 断开旧的父节点
        if let Some(old_parent) = self.nodes[child].parent {
            if let Some(p) = self.nodes.get_mut(old_parent) {
                p.children.retain(|&c| c != child);
            }
        } else {
            self.root_nodes.retain(|&r| r != child);
        }

        self.link(child, parent);
    }

    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    #[must_use]
    pub fn get_node(&self, key: NodeKey) -> Option<&HostNode> {
        self.nodes.get(key)
    }

    pub fn get_node_mut(&mut self, key: NodeKey) -> Option<&mut HostNode> {
        self.nodes.get_mut(key)
    }

    /// 深度优先前序遍历：根节点按插入顺序，子节点按 children 顺序
    #[must_use]
    pub fn traverse(&self) -> Vec<NodeKey> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeKey> = self.root_nodes.iter().rev().copied().collect();

        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(node.children.iter().rev().copied());
        }

        order
    }

    /// 按遍历顺序查找所有满足条件的附加组件
    pub fn find_attachments<'a, T: ?Sized + 'a>(
        &'a self,
        f: impl Fn(&'a Attachment) -> Option<&'a T> + Copy + 'a,
    ) -> Vec<(NodeKey, &'a T)> {
        self.traverse()
            .into_iter()
            .flat_map(move |key| {
                self.nodes[key]
                    .attachments
                    .iter()
                    .filter_map(f)
                    .map(move |found| (key, found))
            })
            .collect()
    }

    /// 显式指定的太阳光，否则取第一个方向光
    #[must_use]
    pub fn sun(&self) -> Option<NodeKey> {
        self.render.sun.or_else(|| {
            self.find_attachments(Attachment::as_light)
                .into_iter()
                .find(|(_, light)| light.kind == LightType::Directional)
                .map(|(key, _)| key)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traverse_is_preorder() {
        let mut scene = HostScene::new("test");
        let a = scene.add_node(HostNode::new("a"));
        let b = scene.add_to_parent(HostNode::new("b"), a);
        let c = scene.add_to_parent(HostNode::new("c"), b);
        let d = scene.add_to_parent(HostNode::new("d"), a);
        let e = scene.add_node(HostNode::new("e"));

        assert_eq!(scene.traverse(), vec![a, b, c, d, e]);
    }

    #[test]
    fn test_attach_moves_root() {
        let mut scene = HostScene::new("test");
        let a = scene.add_node(HostNode::new("a"));
        let b = scene.add_node(HostNode::new("b"));
        scene.attach(b, a);

        assert_eq!(scene.root_nodes, vec![a]);
        assert_eq!(scene.get_node(a).unwrap().children(), &[b]);
        assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
    }
}
