//! 階層式陣列儲存介面
//!
//! 以能力特徵抽象「群組 / 資料集 / 屬性」式的階層儲存：解碼器只透過
//! 本介面讀取，具體後端（磁碟上的階層檔案格式等）實作特徵即可接上。
//! 節點以守衛持有，無論載入成功或提前失敗，離開作用域時一律確定性
//! 釋放。

use std::cell::Cell;
use std::collections::BTreeMap;

/// 儲存節點代號
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreNode(pub u64);

/// 階層式陣列儲存的能力介面
///
/// 子節點列舉必須依名稱遞增排序，且同時包含群組與資料集。每個成功
/// 開啟的節點必須恰好關閉一次；[`NodeGuard`] 負責這件事。
pub trait ArrayStore {
    /// 開啟根節點
    fn open_root(&self) -> Option<StoreNode>;

    /// 開啟子群組；名稱不存在或不是群組時回傳 None
    fn open_group(&self, parent: StoreNode, name: &str) -> Option<StoreNode>;

    /// 關閉先前開啟的節點
    fn close(&self, node: StoreNode);

    /// 依名稱遞增順序列出子節點名稱
    fn child_names(&self, node: StoreNode) -> Vec<String>;

    /// 讀取節點上的整數屬性
    fn attribute(&self, node: StoreNode, name: &str) -> Option<i32>;

    /// 讀取整數陣列資料集的全部內容
    fn read_dataset(&self, node: StoreNode, name: &str) -> Option<Vec<i32>>;
}

/// 節點守衛
///
/// 持有一個已開啟的儲存節點，在離開作用域時關閉，包括每一條提前
/// 返回的驗證失敗路徑。
pub struct NodeGuard<'a> {
    store: &'a dyn ArrayStore,
    node: StoreNode,
}

impl<'a> NodeGuard<'a> {
    /// 開啟根節點
    pub fn root(store: &'a dyn ArrayStore) -> Option<Self> {
        store.open_root().map(|node| NodeGuard { store, node })
    }

    /// 開啟子群組
    pub fn child(&self, name: &str) -> Option<NodeGuard<'a>> {
        self.store.open_group(self.node, name).map(|node| NodeGuard {
            store: self.store,
            node,
        })
    }

    pub fn child_names(&self) -> Vec<String> {
        self.store.child_names(self.node)
    }

    pub fn attribute(&self, name: &str) -> Option<i32> {
        self.store.attribute(self.node, name)
    }

    pub fn read_dataset(&self, name: &str) -> Option<Vec<i32>> {
        self.store.read_dataset(self.node, name)
    }
}

impl Drop for NodeGuard<'_> {
    fn drop(&mut self) {
        self.store.close(self.node);
    }
}

#[derive(Debug, Default)]
struct MemNode {
    groups: BTreeMap<String, usize>,
    datasets: BTreeMap<String, Vec<i32>>,
    attributes: BTreeMap<String, i32>,
}

/// 記憶體內的陣列儲存
///
/// [`ArrayStore`] 的參考實作：測試替身，也示範真實後端轉接器需要的
/// 行為（名稱排序的子節點列舉、開啟 / 關閉配對）。`open_handles`
/// 回報目前尚未關閉的節點數，供驗證資源釋放。
#[derive(Debug, Default)]
pub struct MemArrayStore {
    nodes: Vec<MemNode>,
    open_count: Cell<usize>,
}

impl MemArrayStore {
    /// 根節點代號
    pub const ROOT: usize = 0;

    pub fn new() -> Self {
        MemArrayStore {
            nodes: vec![MemNode::default()],
            open_count: Cell::new(0),
        }
    }

    /// 在 `parent` 下新增群組，回傳新節點代號
    pub fn add_group(&mut self, parent: usize, name: &str) -> usize {
        let id = self.nodes.len();
        self.nodes.push(MemNode::default());
        self.nodes[parent].groups.insert(name.to_string(), id);
        id
    }

    /// 設定節點上的整數屬性
    pub fn set_attribute(&mut self, node: usize, name: &str, value: i32) {
        self.nodes[node].attributes.insert(name.to_string(), value);
    }

    /// 在節點下新增整數陣列資料集
    pub fn add_dataset(&mut self, node: usize, name: &str, values: Vec<i32>) {
        self.nodes[node].datasets.insert(name.to_string(), values);
    }

    /// 目前已開啟而尚未關閉的節點數
    pub fn open_handles(&self) -> usize {
        self.open_count.get()
    }

    fn acquire(&self, id: usize) -> StoreNode {
        self.open_count.set(self.open_count.get() + 1);
        StoreNode(id as u64)
    }
}

impl ArrayStore for MemArrayStore {
    fn open_root(&self) -> Option<StoreNode> {
        Some(self.acquire(Self::ROOT))
    }

    fn open_group(&self, parent: StoreNode, name: &str) -> Option<StoreNode> {
        let id = *self.nodes.get(parent.0 as usize)?.groups.get(name)?;
        Some(self.acquire(id))
    }

    fn close(&self, _node: StoreNode) {
        self.open_count.set(self.open_count.get() - 1);
    }

    fn child_names(&self, node: StoreNode) -> Vec<String> {
        let Some(node) = self.nodes.get(node.0 as usize) else {
            return Vec::new();
        };
        let mut names: Vec<String> = node
            .groups
            .keys()
            .chain(node.datasets.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    fn attribute(&self, node: StoreNode, name: &str) -> Option<i32> {
        self.nodes
            .get(node.0 as usize)?
            .attributes
            .get(name)
            .copied()
    }

    fn read_dataset(&self, node: StoreNode, name: &str) -> Option<Vec<i32>> {
        self.nodes.get(node.0 as usize)?.datasets.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_are_listed_in_name_order() {
        let mut store = MemArrayStore::new();
        let plot = store.add_group(MemArrayStore::ROOT, "Plot");
        store.add_group(plot, "prices");
        store.add_dataset(plot, "TradingSegments", vec![]);
        store.add_group(plot, "flows");

        let root = NodeGuard::root(&store).unwrap();
        let plot = root.child("Plot").unwrap();
        assert_eq!(plot.child_names(), ["TradingSegments", "flows", "prices"]);
    }

    #[test]
    fn test_open_group_rejects_datasets_and_unknown_names() {
        let mut store = MemArrayStore::new();
        store.add_dataset(MemArrayStore::ROOT, "data", vec![1, 2]);

        let root = NodeGuard::root(&store).unwrap();
        assert!(root.child("data").is_none());
        assert!(root.child("missing").is_none());
        assert_eq!(root.read_dataset("data"), Some(vec![1, 2]));
    }

    #[test]
    fn test_guards_release_on_every_path() {
        let mut store = MemArrayStore::new();
        let plot = store.add_group(MemArrayStore::ROOT, "Plot");
        store.set_attribute(plot, "DisplayRange", 30);

        {
            let root = NodeGuard::root(&store).unwrap();
            let plot = root.child("Plot").unwrap();
            assert_eq!(store.open_handles(), 2);
            assert_eq!(plot.attribute("DisplayRange"), Some(30));
            assert_eq!(plot.attribute("Centre"), None);
        }
        assert_eq!(store.open_handles(), 0);
    }
}
