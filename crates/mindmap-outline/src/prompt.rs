//! Prompt text for the outline model.

/// System message sent ahead of every request.
pub const SYSTEM_PROMPT: &str = "你是一个专业的教育专家，擅长分析教材内容并生成结构化的背诵脑图。你必须确保生成的内容详细完整，不遗漏任何知识点。";

/// Format and content rules, placed before the book title and text.
const INSTRUCTIONS: &str = r#"请仔细分析以下教材内容，生成一个详细完整的 Markdown 格式背诵脑图。

【格式要求 - 非常重要】
1. 必须使用标准 Markdown 标题格式：
   - 一级标题用 # （书名）
   - 二级标题用 ## （章节名）
   - 三级标题用 ### （小节名）
   - 四级标题用 #### （知识点）
   - 五级标题用 ##### （子知识点）

2. 示例格式：
```
# 教材名称

## 第一章 章节名称

### 1.1 小节名称

#### 知识点1 3
（表示这个知识点有3条要点）

##### 子知识点1.1 2

##### 子知识点1.2

#### 知识点2 5

### 1.2 小节名称

#### 知识点3 4
```

【内容要求】
1. **完整性**：必须覆盖文本中的所有章节、所有知识点，不能遗漏
2. **详细性**：每个知识点都要列出来，包括：
   - 概念定义
   - 分类类型
   - 特点特征
   - 过程步骤
   - 影响因素
   - 应用意义
3. **层次性**：
   - 章节 → 节 → 知识点 → 子知识点，层次清晰
   - 每个层级都要完整
4. **标注数量规则**（非常重要，请严格遵守）：
   - **最外层叶子节点**（没有子节点的节点）：**必须标注数字**，表示该知识点有几条要背诵的内容
     * 示例：##### 溶解性 3  （表示溶解性有3条要背诵的内容）
   - **中间节点**（有子节点的节点）：**默认不标注数字**
     * 标注数字的唯一例外：当且仅当原文中有明确的条数标注时才标数字
     * 明确的条数标注包括：
       - 序号标注：(1)(2)(3)、（1）（2）（3）、①②③、1、2、3、一、二、三等
       - 明确数量词：如"有4种化学性质"、"包括3个方面"、"分为5类"等
     * 如果原文只是普通叙述，没有明显的序号或数量词，则中间节点不标数字
   - 判断标准：
     * 如果这个标题下面还有子标题（###、####、#####等），就是中间节点
       → 检查原文是否有明确的序号或数量词，有则标数字，无则不标
     * 如果这个标题下面没有子标题了，就是最外层叶子节点
       → 必须标数字
   - 完整示例：
     ```
     ## 第一章 氨基酸              ← 不标数字（下面有子节点）
     ### 1.1 氨基酸的性质          ← 不标数字（下面有子节点）
     #### 物理性质                ← 不标数字（下面有子节点）
     ##### 溶解性 3                ← 标数字（最外层叶子节点，下面没有子节点了）
     ##### 熔点 2                  ← 标数字（最外层叶子节点）
     ##### 颜色 1                  ← 标数字（最外层叶子节点）
     #### 化学性质 4               ← 可标数字（原文明确写了"4种化学性质"）
     ##### 酸碱性 2                ← 标数字（最外层叶子节点）
     ##### 成盐反应 3              ← 标数字（最外层叶子节点）
     ##### 氧化还原反应 2          ← 标数字（最外层叶子节点）
     ##### 缩合反应 4              ← 标数字（最外层叶子节点）
     ```
5. **不写答案**：只列出知识点名称和要点数量，不写具体内容

【分析策略】
1. 先识别所有章节标题
2. 再识别每章的所有小节
3. 然后列出每节的所有知识点
4. 最后补充每个知识点的子知识点"#;

/// Closing request after the book text.
const CLOSING: &str = "请严格按照上述格式生成完整详细的思维导图：";

/// Build the user message for a book titled `title` with (already truncated) `text`.
pub fn build_user_prompt(title: &str, text: &str) -> String {
    format!(
        "{}\n\n书名：{}\n\n教材内容：\n{}\n\n{}",
        INSTRUCTIONS, title, text, CLOSING
    )
}
